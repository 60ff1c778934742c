use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::feed::Article;

pub const DEFAULT_MAX_ITEMS: usize = 25;

/// Articles of one category, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub name: String,
    pub articles: Vec<Article>,
}

/// Category groups in configuration order; serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedCategories(Vec<CategoryGroup>);

impl RankedCategories {
    pub fn get(&self, name: &str) -> Option<&[Article]> {
        self.0
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.articles.as_slice())
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn article_count(&self) -> usize {
        self.0.iter().map(|g| g.articles.len()).sum()
    }
}

impl Serialize for RankedCategories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in &self.0 {
            map.serialize_entry(&group.name, &group.articles)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone)]
pub struct Ranker {
    max_items: usize,
    keep_empty: bool,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

impl Ranker {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            keep_empty: true,
        }
    }

    /// When false, configured categories without articles are left out.
    pub fn keep_empty(mut self, keep_empty: bool) -> Self {
        self.keep_empty = keep_empty;
        self
    }

    /// Group `articles` by category, newest first, at most `max_items` each.
    ///
    /// Groups follow the order of `configured`; categories that only show up
    /// on articles are appended in first-seen order. Articles with equal
    /// timestamps keep their input order.
    pub fn rank<'c, I>(&self, configured: I, articles: Vec<Article>) -> RankedCategories
    where
        I: IntoIterator<Item = &'c str>,
    {
        let mut groups: Vec<CategoryGroup> = configured
            .into_iter()
            .map(|name| CategoryGroup {
                name: name.to_string(),
                articles: Vec::new(),
            })
            .collect();

        for article in articles {
            match groups.iter_mut().find(|g| g.name == article.category) {
                Some(group) => group.articles.push(article),
                None => groups.push(CategoryGroup {
                    name: article.category.clone(),
                    articles: vec![article],
                }),
            }
        }

        for group in &mut groups {
            group.articles.sort_by(|a, b| b.published.cmp(&a.published));
            group.articles.truncate(self.max_items);
        }

        if !self.keep_empty {
            groups.retain(|g| !g.articles.is_empty());
        }

        RankedCategories(groups)
    }
}

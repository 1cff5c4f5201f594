//! A static list of well-known books, grouped by category, so you can search
//! for them without typing out the whole title.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Category names are matched case-insensitively.
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, titles)| titles.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, titles)| (name.as_str(), titles.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in `new` replace existing ones with the same name.
    pub fn update(&mut self, new: Catalog) {
        for (name, titles) in new.categories {
            self.categories
                .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            self.categories.insert(name, titles);
        }
    }
}

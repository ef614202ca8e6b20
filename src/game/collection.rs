use crate::game::cards_types::{CardAttribute, CardTemplate};

/// Ordered set of templates, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    cards: Vec<CardTemplate>,
}

impl Collection {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Builds a collection, keeping the first template of each name.
    pub fn from_templates(templates: impl IntoIterator<Item = CardTemplate>) -> Self {
        let mut collection = Self::new();
        for template in templates {
            collection.add(template);
        }
        collection
    }

    /// Returns false (and keeps the existing entry) if the name is already present.
    pub fn add(&mut self, template: CardTemplate) -> bool {
        if self.contains(template.name()) {
            return false;
        }
        self.cards.push(template);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&CardTemplate> {
        self.cards.iter().find(|card| card.name() == name)
    }

    /// Swaps in a new version of an existing card, keeping its position.
    pub fn replace(&mut self, template: CardTemplate) -> bool {
        match self.cards.iter().position(|card| card.name() == template.name()) {
            Some(index) => {
                self.cards[index] = template;
                true
            }
            None => false,
        }
    }

    pub fn upgrade(&mut self, name: &str, attribute: CardAttribute) -> Option<&CardTemplate> {
        let index = self.cards.iter().position(|card| card.name() == name)?;
        self.cards[index] = self.cards[index].with_upgrade(attribute);
        Some(&self.cards[index])
    }

    pub fn max_usable(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardTemplate> {
        self.cards.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.cards.iter().map(|card| card.name().to_string()).collect()
    }
}

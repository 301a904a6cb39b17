use std::collections::HashMap;

use crate::models::ClassType;

/// Resolves the decorative picture shown for a class type. `None` means the
/// view falls back to the type label.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, class_type: ClassType) -> Option<String>;
}

/// Serves `{base}/{type}-class.jpg` for the types it has pictures for.
#[derive(Clone, Debug)]
pub struct AssetImageResolver {
    images: HashMap<ClassType, String>,
}

impl AssetImageResolver {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let images = ClassType::ALL
            .into_iter()
            .map(|t| {
                let file = format!("{base}/{}-class.jpg", t.label().to_lowercase());
                (t, file)
            })
            .collect();
        Self { images }
    }

    #[cfg(test)]
    pub fn without(mut self, class_type: ClassType) -> Self {
        self.images.remove(&class_type);
        self
    }
}

impl ImageResolver for AssetImageResolver {
    fn resolve(&self, class_type: ClassType) -> Option<String> {
        self.images.get(&class_type).cloned()
    }
}

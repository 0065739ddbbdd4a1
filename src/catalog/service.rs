//! Punk records with served image URLs.
//!
//! [`PunkService`] is the query surface a REST layer sits on: it combines the
//! static [`Dataset`] with the [`ImageStrategy`] selected from configuration.
//! Every record it returns carries the strategy's URL in place of the
//! dataset's stored image.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::dataset::{BasePunk, Dataset, FilterQuery};
use crate::config::PunksConfig;
use crate::core::{PunkId, PunksError, UrlTemplate};
use crate::resolver::Resolver;

/// A punk as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Punk {
    pub id: PunkId,
    #[serde(rename = "type")]
    pub punk_type: String,
    pub image: String,
    pub accessories: Vec<String>,
}

impl Punk {
    fn from_base(id: PunkId, base: &BasePunk, image: String) -> Self {
        Self {
            id,
            punk_type: base.punk_type.clone(),
            image,
            accessories: base.accessories.clone(),
        }
    }
}

/// How image URLs are produced, fixed at startup.
#[derive(Debug, Clone)]
pub enum ImageStrategy {
    /// Computed from the id alone.
    Template(UrlTemplate),
    /// Looked up through the mapping store and provider.
    ResolverBacked(Arc<Resolver>),
}

impl ImageStrategy {
    /// Build the strategy for `config.image_source`.
    ///
    /// Resolver-backed sources load the mapping file and need an API key.
    pub async fn from_config(config: &PunksConfig) -> Result<Self, PunksError> {
        match config.image_source.template() {
            Some(template) => Ok(Self::Template(template)),
            None => Ok(Self::ResolverBacked(Arc::new(Resolver::from_config(config).await?))),
        }
    }

    pub async fn url_for(&self, id: PunkId) -> String {
        match self {
            Self::Template(template) => template.url_for(id),
            Self::ResolverBacked(resolver) => resolver.resolve(id).await,
        }
    }

    pub async fn urls_for(&self, ids: Vec<PunkId>) -> BTreeMap<PunkId, String> {
        match self {
            Self::Template(template) => ids.into_iter().map(|id| (id, template.url_for(id))).collect(),
            Self::ResolverBacked(resolver) => resolver.resolve_all(ids).await,
        }
    }

    /// Flush durable state, if any.
    pub async fn shutdown(&self) -> Result<(), PunksError> {
        match self {
            Self::Template(_) => Ok(()),
            Self::ResolverBacked(resolver) => resolver.shutdown().await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PunkService {
    dataset: Arc<Dataset>,
    images: ImageStrategy,
}

impl PunkService {
    pub fn new(dataset: Arc<Dataset>, images: ImageStrategy) -> Self {
        Self { dataset, images }
    }

    /// Load the dataset and image strategy described by `config`.
    pub async fn from_config(config: &PunksConfig) -> Result<Self, PunksError> {
        let dataset = Dataset::load(&config.dataset_path()).await?;
        let images = ImageStrategy::from_config(config).await?;
        Ok(Self::new(Arc::new(dataset), images))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn images(&self) -> &ImageStrategy {
        &self.images
    }

    /// The punk with `id`, or `None` if it is not in the dataset.
    pub async fn find(&self, id: PunkId) -> Option<Punk> {
        let base = self.dataset.get(id)?;
        let image = self.images.url_for(id).await;
        Some(Punk::from_base(id, base, image))
    }

    /// Like [`find`](Self::find) for raw input, with typed errors.
    ///
    /// # Errors
    ///
    /// - [`PunksError::InvalidPunkId`] if `raw` is not a decimal id
    /// - [`PunksError::PunkNotFound`] if the id is not in the dataset
    pub async fn find_str(&self, raw: &str) -> Result<Punk, PunksError> {
        let id: PunkId = raw.parse()?;
        self.find(id).await.ok_or_else(|| PunksError::PunkNotFound {
            id: id.to_string(),
        })
    }

    /// Every punk in id order.
    pub async fn find_all(&self) -> Vec<Punk> {
        let urls = self.images.urls_for(self.dataset.ids().collect()).await;
        self.dataset
            .iter()
            .filter_map(|(id, base)| {
                urls.get(&id).map(|image| Punk::from_base(id, base, image.clone()))
            })
            .collect()
    }

    pub fn types(&self) -> Vec<String> {
        self.dataset.types()
    }

    pub fn accessories(&self) -> Vec<String> {
        self.dataset.accessories()
    }

    /// Random sample of punks matching `query`.
    pub async fn filter(&self, query: &FilterQuery) -> Vec<Punk> {
        let matches: Vec<(PunkId, BasePunk)> = self
            .dataset
            .filter(query)
            .into_iter()
            .map(|(id, base)| (id, base.clone()))
            .collect();

        let mut punks = Vec::with_capacity(matches.len());
        for (id, base) in matches {
            let image = self.images.url_for(id).await;
            punks.push(Punk::from_base(id, &base, image));
        }
        punks
    }
}

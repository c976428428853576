pub mod echo;
pub mod featurecollection;
pub mod whosonfirst;

use std::collections::HashMap;

use url::Url;

use crate::data::capture::GeotagCapture;
use crate::errors::{Error, Result};
use crate::store::StoreRegistry;

/// Capability for persisting a geotag capture against a place.
pub trait FeatureWriter {
    fn write_feature(&self, uri: &str, capture: &GeotagCapture) -> Result<()>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

type FeatureWriterConstructor =
    Box<dyn Fn(&Url, &StoreRegistry) -> Result<Box<dyn FeatureWriter>> + Send + Sync>;

/// Name-keyed registry of feature-writer implementations, owned by the
/// composition root. Implementations are looked up by the scheme of the
/// configured writer address at startup.
#[derive(Default)]
pub struct FeatureWriterRegistry {
    constructors: HashMap<String, FeatureWriterConstructor>,
}

impl FeatureWriterRegistry {
    pub fn new() -> FeatureWriterRegistry {
        FeatureWriterRegistry::default()
    }

    /// Registry preloaded with the `whosonfirst` and `echo` writers.
    pub fn with_defaults() -> Result<FeatureWriterRegistry> {
        let mut registry = FeatureWriterRegistry::new();

        registry.register(
            "whosonfirst",
            Box::new(|address, stores| {
                let writer = whosonfirst::WhosOnFirstWriter::from_address(address, stores)?;
                Ok(Box::new(writer) as Box<dyn FeatureWriter>)
            }),
        )?;
        registry.register(
            "echo",
            Box::new(|_, _| Ok(Box::new(echo::EchoWriter::stdout()) as Box<dyn FeatureWriter>)),
        )?;

        Ok(registry)
    }

    pub fn register(&mut self, name: &str, ctor: FeatureWriterConstructor) -> Result<()> {
        if self.constructors.contains_key(name) {
            return Err(Error::DuplicateRegistration(name.to_string()));
        }
        self.constructors.insert(name.to_string(), ctor);
        Ok(())
    }

    pub fn new_writer(
        &self,
        address: &str,
        stores: &StoreRegistry,
    ) -> Result<Box<dyn FeatureWriter>> {
        let url = Url::parse(address)?;
        let ctor = self
            .constructors
            .get(url.scheme())
            .ok_or_else(|| Error::UnknownScheme(url.scheme().to_string()))?;
        ctor(&url, stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut registry = FeatureWriterRegistry::with_defaults().unwrap();
        let res = registry.register(
            "echo",
            Box::new(|_, _| Ok(Box::new(echo::EchoWriter::stdout()) as Box<dyn FeatureWriter>)),
        );

        assert!(matches!(res, Err(Error::DuplicateRegistration(_))));
    }

    #[test]
    fn writers_resolve_by_scheme() {
        let stores = StoreRegistry::with_defaults().unwrap();
        let registry = FeatureWriterRegistry::with_defaults().unwrap();

        let address = "whosonfirst://?writer=memory%3A%2F%2F%2F&reader=memory%3A%2F%2F%2F";
        assert!(registry.new_writer(address, &stores).is_ok());

        assert!(matches!(
            registry.new_writer("telegraph://?writer=memory%3A%2F%2F%2F", &stores),
            Err(Error::UnknownScheme(_))
        ));
    }
}

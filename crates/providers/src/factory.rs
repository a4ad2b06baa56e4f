use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use synapse_core::config::Config;
use synapse_core::response::AgentKind;

use crate::http::HttpSpecialist;
use crate::Specialist;

/// Build the full specialist set from config. Kinds without an explicit
/// backend section fall back to the default backend config.
pub fn create_specialists(config: &Config) -> HashMap<AgentKind, Arc<dyn Specialist>> {
    let mut specialists: HashMap<AgentKind, Arc<dyn Specialist>> = HashMap::new();
    for kind in [
        AgentKind::Architect,
        AgentKind::Reasoner,
        AgentKind::Creative,
        AgentKind::Instructor,
    ] {
        let backend = config.backend(kind.as_str()).cloned().unwrap_or_default();
        debug!(agent = %kind, model = %backend.model, "specialist configured");
        specialists.insert(kind, Arc::new(HttpSpecialist::new(kind, &backend)));
    }
    specialists
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_present() {
        let specialists = create_specialists(&Config::default());
        assert_eq!(specialists.len(), 4);
        for kind in [
            AgentKind::Architect,
            AgentKind::Reasoner,
            AgentKind::Creative,
            AgentKind::Instructor,
        ] {
            assert_eq!(specialists.get(&kind).unwrap().kind(), kind);
        }
    }
}

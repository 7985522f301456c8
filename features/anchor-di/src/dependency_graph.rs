use std::{
    any::TypeId,
    collections::{BTreeMap, HashMap},
};

use thiserror::Error;

use crate::types::{DependencyInfo, TypeInfo};

/// Graph of every bound service
/// Used to check circular and missing dependencies before resolution
pub struct DependencyGraph {
    map: BTreeMap<TypeId, DependencyGraphEntry>,
}
impl DependencyGraph {
    pub(crate) fn new<'a>(
        entries: impl IntoIterator<Item = (TypeInfo, &'a [DependencyInfo])>,
    ) -> Self {
        let map = entries
            .into_iter()
            .map(|(info, dependencies)| {
                let entry = DependencyGraphEntry {
                    info,
                    dependencies: dependencies.to_vec(),
                };
                (info.type_id, entry)
            })
            .collect();

        Self { map }
    }

    /// Dependencies the given service's constructor requests
    ///
    /// Returns None if the service is not part of the graph
    pub fn dependencies_of(&self, service: TypeId) -> Option<&[DependencyInfo]> {
        self.map
            .get(&service)
            .map(|entry| entry.dependencies.as_slice())
    }

    /// All services in the graph
    pub fn services(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.map.values().map(|entry| entry.info)
    }

    /// Validate the graph
    ///
    /// Walks the graph depth first, coloring each node as in progress while it is
    /// on the current path and done once all its dependencies were walked.
    /// Reaching an in progress node again closes a cycle.
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut visits = HashMap::new();
        let mut errors = Vec::new();
        for entry in self.map.values() {
            let mut dependency_chain = Vec::new();
            check_recurse(self, &mut visits, &mut errors, &mut dependency_chain, entry);
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            visits: &mut HashMap<TypeId, Visit>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<TypeInfo>,
            entry: &DependencyGraphEntry,
        ) {
            match visits.get(&entry.info.type_id) {
                Some(Visit::Done) => return,
                Some(Visit::InProgress) => {
                    // The chain holds the path from the walk's root, the cycle starts at the first visit of this entry
                    let start = dependency_chain
                        .iter()
                        .position(|info| *info == entry.info)
                        .unwrap_or_default();
                    let mut chain = dependency_chain[start..].to_vec();
                    let from = *chain.last().unwrap_or(&entry.info);
                    chain.push(entry.info); // Add current so chain is complete

                    errors.push(DependencyGraphError::CircularDependency {
                        from,
                        to: entry.info,
                        chain,
                    });
                    return;
                }
                None => {}
            }

            visits.insert(entry.info.type_id, Visit::InProgress);
            dependency_chain.push(entry.info);

            for dependency in &entry.dependencies {
                let Some(next_entry) = graph.map.get(&dependency.type_info.type_id) else {
                    if !dependency.optional {
                        errors.push(DependencyGraphError::MissingDependency {
                            dependency: dependency.type_info,
                            required_by: entry.info,
                        });
                    }

                    continue;
                };

                check_recurse(graph, visits, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
            visits.insert(entry.info.type_id, Visit::Done);
        }
    }
}

#[derive(Clone, Copy)]
enum Visit {
    InProgress,
    Done,
}

struct DependencyGraphEntry {
    info: TypeInfo,
    dependencies: Vec<DependencyInfo>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: TypeInfo,
        required_by: TypeInfo,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CircularDependency {
        from: TypeInfo,
        to: TypeInfo,
        chain: Vec<TypeInfo>,
    },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
impl DependencyGraphErrors {
    pub fn has_circular_dependency(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, DependencyGraphError::CircularDependency { .. }))
    }

    pub fn has_missing_dependency(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, DependencyGraphError::MissingDependency { .. }))
    }
}

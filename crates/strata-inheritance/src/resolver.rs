//! ConfigInheritance: resolve effective configuration and validate updates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::Stream;
use strata_hierarchy::HierarchyEngine;

use crate::merge::deep_merge;
use crate::role_defaults::role_default;
use crate::schema::ConfigSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfigOptions {
    /// Merge onto the stored document instead of replacing it.
    pub merge: bool,
    /// Validate the update as it would resolve under the stream's ancestors.
    pub inherit_from_parent: bool,
    /// Validate and report only; nothing is written.
    pub validate_only: bool,
}

impl Default for SetConfigOptions {
    fn default() -> Self {
        Self {
            merge: true,
            inherit_from_parent: false,
            validate_only: false,
        }
    }
}

/// Outcome of [`ConfigInheritance::set_config`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    /// The stream's own document after the update (what is or would be stored).
    pub config: Value,
    /// The document that was validated.
    pub validated: Value,
    pub persisted: bool,
}

pub struct ConfigInheritance {
    hierarchy: Arc<HierarchyEngine>,
    schema: ConfigSchema,
}

impl ConfigInheritance {
    pub fn new(hierarchy: Arc<HierarchyEngine>) -> Self {
        Self::with_schema(hierarchy, ConfigSchema::standard())
    }

    pub fn with_schema(hierarchy: Arc<HierarchyEngine>, schema: ConfigSchema) -> Self {
        Self { hierarchy, schema }
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    /// Effective configuration of `stream_id`: the root's role defaults, then
    /// every config along the inheritance chain from the root down.
    pub fn resolve(&self, stream_id: &str) -> StrataResult<Value> {
        let chain = self.hierarchy.inheritance_chain(stream_id)?;
        Ok(fold_chain(&chain))
    }

    /// What `stream_id` inherits before its own document is applied.
    pub fn inherited(&self, stream_id: &str) -> StrataResult<Value> {
        let chain = self.hierarchy.inheritance_chain(stream_id)?;
        Ok(inherited_from(&chain))
    }

    /// Update the explicit configuration of `stream_id`.
    ///
    /// A schema failure returns `ValidationError` and writes nothing. Only the
    /// stream's own portion is ever persisted. The merge reads and writes the
    /// stored document under the hierarchy's write lock, so concurrent merges
    /// of different keys all survive.
    pub fn set_config(
        &self,
        stream_id: &str,
        partial: &Value,
        options: SetConfigOptions,
        actor: &str,
    ) -> StrataResult<ConfigUpdate> {
        let update = self.hierarchy.update_config(stream_id, actor, |chain| {
            let Some(stream) = chain.first() else {
                return Err(StrataError::not_found("stream", stream_id));
            };
            let config = if options.merge {
                deep_merge(&stream.config, partial)
            } else {
                partial.clone()
            };
            let validated = if options.inherit_from_parent {
                deep_merge(&inherited_from(chain), &config)
            } else {
                config.clone()
            };

            if let Err(e) = self.schema.check(&validated) {
                tracing::info!(stream_id = %stream_id, paths = ?e.field_paths(), "config update rejected");
                return Err(e);
            }
            let persisted = !options.validate_only;
            let write = persisted.then(|| config.clone());
            Ok((
                write,
                ConfigUpdate {
                    config,
                    validated,
                    persisted,
                },
            ))
        })?;
        if update.persisted {
            tracing::debug!(stream_id = %stream_id, merge = options.merge, "config updated");
        }
        Ok(update)
    }
}

/// Inherited configuration for the first stream of `chain`.
fn inherited_from(chain: &[Stream]) -> Value {
    match chain.split_first() {
        Some((own, [])) => role_default(own.role),
        Some((_, ancestors)) => fold_chain(ancestors),
        None => Value::Object(Default::default()),
    }
}

/// `chain` runs from a stream up to its root.
fn fold_chain(chain: &[Stream]) -> Value {
    let Some(root) = chain.last() else {
        return Value::Object(Default::default());
    };
    chain
        .iter()
        .rev()
        .fold(role_default(root.role), |acc, stream| deep_merge(&acc, &stream.config))
}

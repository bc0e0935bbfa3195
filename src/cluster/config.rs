//! Configuration for a controller-capable cluster member.
//!
//! ```rust,no_run
//! use helmsman::cluster::ControllerConfig;
//!
//! let config = ControllerConfig::from_env().expect("invalid environment");
//! if let Err(errors) = config.validate() {
//!     for error in errors {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

use crate::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_COORDINATION_ADDRESS};
use crate::telemetry::LogFormat;
use crate::types::InstanceType;

/// Identity and connection settings of one cluster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Cluster this member belongs to.
    pub cluster_name: String,

    /// Unique name of this member within the cluster.
    pub instance_name: String,

    /// Role this member was started with.
    pub instance_type: InstanceType,

    /// Address of the coordination service.
    ///
    /// Not dialled by this crate. The embedding application hands it to the
    /// client behind its [`ClusterManager`](super::ClusterManager) and
    /// [`ClusterManagerFactory`](super::ClusterManagerFactory).
    pub coordination_address: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            instance_name: "controller_0".to_string(),
            instance_type: InstanceType::Controller,
            coordination_address: DEFAULT_COORDINATION_ADDRESS.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ControllerConfig {
    /// Validate the configuration and return any errors found.
    ///
    /// This should be called at startup to catch configuration issues early.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.cluster_name.trim().is_empty() {
            errors.push("cluster_name must not be empty".to_string());
        }

        if self.instance_name.trim().is_empty() {
            errors.push("instance_name must not be empty".to_string());
        }

        // Store paths are derived from these names
        for (field, value) in [
            ("cluster_name", &self.cluster_name),
            ("instance_name", &self.instance_name),
        ] {
            if value.contains('/') {
                errors.push(format!("{field} ({value}) must not contain '/'"));
            }
        }

        if self.coordination_address.trim().is_empty() {
            errors.push("coordination_address must not be empty".to_string());
        }

        if !self.instance_type.can_lead() {
            errors.push(format!(
                "instance_type ({}) cannot act as controller; use CONTROLLER or CONTROLLER_PARTICIPANT",
                self.instance_type
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CLUSTER_NAME`: Cluster name (default: helmsman-cluster)
    /// - `INSTANCE_NAME`: Instance name (default: controller_0)
    /// - `INSTANCE_TYPE`: `CONTROLLER` or `CONTROLLER_PARTICIPANT` (default: CONTROLLER)
    /// - `COORDINATION_ADDRESS`: Coordination service address (default: localhost:2181)
    /// - `LOG_FORMAT`: `json` or `pretty` (default: pretty)
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();

        let cluster_name = std::env::var("CLUSTER_NAME").unwrap_or(defaults.cluster_name);
        let instance_name = std::env::var("INSTANCE_NAME").unwrap_or(defaults.instance_name);

        let instance_type = match std::env::var("INSTANCE_TYPE") {
            Ok(value) => value
                .parse::<InstanceType>()
                .map_err(|e| format!("Invalid INSTANCE_TYPE: {}", e))?,
            Err(_) => defaults.instance_type,
        };

        let coordination_address =
            std::env::var("COORDINATION_ADDRESS").unwrap_or(defaults.coordination_address);

        Ok(Self {
            cluster_name,
            instance_name,
            instance_type,
            coordination_address,
            log_format: LogFormat::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = ControllerConfig {
            cluster_name: "".to_string(),
            instance_name: "a/b".to_string(),
            instance_type: InstanceType::Participant,
            coordination_address: " ".to_string(),
            log_format: LogFormat::Json,
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("PARTICIPANT")));
        assert!(errors.iter().any(|e| e.contains("'/'")));
    }

    #[test]
    fn test_controller_participant_is_valid() {
        let config = ControllerConfig {
            instance_type: InstanceType::ControllerParticipant,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

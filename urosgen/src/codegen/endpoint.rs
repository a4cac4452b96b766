/// Endpoint configuration model
use std::fmt;

use serde::{Deserialize, Serialize};

/// Communication role of a requested endpoint
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes messages on a topic
    Publisher,
    /// Subscribes to messages on a topic
    Subscriber,
    /// Serves requests
    Service,
    /// Sends requests to a service
    Client,
    /// Fires a callback at a fixed rate
    Timer,
}

impl Role {
    /// Suffix appended to the local name to form the handler identifier
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Publisher => "publisher",
            Self::Subscriber => "subscription",
            Self::Service => "service",
            Self::Client => "client",
            Self::Timer => "timer",
        }
    }

    /// C type of the handler variable
    #[must_use]
    pub fn handler_type(&self) -> &'static str {
        match self {
            Self::Publisher => "rcl_publisher_t",
            Self::Subscriber => "rcl_subscription_t",
            Self::Service => "rcl_service_t",
            Self::Client => "rcl_client_t",
            Self::Timer => "rcl_timer_t",
        }
    }

    /// Interface category the role's type reference must name
    #[must_use]
    pub fn expected_category(&self) -> Option<&'static str> {
        match self {
            Self::Publisher | Self::Subscriber => Some("msg"),
            Self::Service | Self::Client => Some("srv"),
            Self::Timer => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Publisher => "publisher",
            Self::Subscriber => "subscriber",
            Self::Service => "service",
            Self::Client => "client",
            Self::Timer => "timer",
        };
        f.write_str(name)
    }
}

/// Delivery guarantee for publishers and subscribers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    /// Messages may be dropped
    BestEffort,
    /// Delivery is retried until acknowledged
    #[default]
    Reliable,
}

impl Reliability {
    /// Value substituted into init templates; selects between the
    /// `*_init_best_effort` and `*_init_default` runtime entry points
    #[must_use]
    pub fn template_value(&self) -> &'static str {
        match self {
            Self::BestEffort => "best_effort",
            Self::Reliable => "default",
        }
    }
}

/// One requested communication endpoint.
///
/// Endpoint lists are immutable input to the engine; they load from JSON
/// configuration or are built programmatically with the role constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// The endpoint's role
    pub role: Role,
    /// Local name; every generated identifier derives from it
    #[serde(rename = "name")]
    pub local_name: String,
    /// `package/category/TypeName` reference (absent for timers)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<String>,
    /// Delivery guarantee (publishers and subscribers only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos: Option<Reliability>,
    /// Firing rate in Hz (timers only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_hz: Option<f64>,
}

impl EndpointSpec {
    /// Build a publisher endpoint
    #[must_use]
    pub fn publisher(name: &str, type_ref: &str, qos: Reliability) -> Self {
        EndpointSpec {
            role: Role::Publisher,
            local_name: name.to_string(),
            type_ref: Some(type_ref.to_string()),
            qos: Some(qos),
            rate_hz: None,
        }
    }

    /// Build a subscriber endpoint
    #[must_use]
    pub fn subscriber(name: &str, type_ref: &str, qos: Reliability) -> Self {
        EndpointSpec {
            role: Role::Subscriber,
            ..Self::publisher(name, type_ref, qos)
        }
    }

    /// Build a service endpoint
    #[must_use]
    pub fn service(name: &str, type_ref: &str) -> Self {
        EndpointSpec {
            role: Role::Service,
            local_name: name.to_string(),
            type_ref: Some(type_ref.to_string()),
            qos: None,
            rate_hz: None,
        }
    }

    /// Build a client endpoint
    #[must_use]
    pub fn client(name: &str, type_ref: &str) -> Self {
        EndpointSpec {
            role: Role::Client,
            ..Self::service(name, type_ref)
        }
    }

    /// Build a timer endpoint
    #[must_use]
    pub fn timer(name: &str, rate_hz: f64) -> Self {
        EndpointSpec {
            role: Role::Timer,
            local_name: name.to_string(),
            type_ref: None,
            qos: None,
            rate_hz: Some(rate_hz),
        }
    }

    /// Handler identifier: `<localName>_<roleSuffix>`
    #[must_use]
    pub fn handler(&self) -> String {
        format!("{}_{}", self.local_name, self.role.suffix())
    }
}

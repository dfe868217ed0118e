//! Core State trait for tracked field values.
//!
//! A state is the value stored in the tracked field of an entity. The engine
//! never interprets states beyond equality, so any small value type works.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for values held by a tracked field.
///
/// # Required Traits
///
/// - `Clone`: States are copied into history and pending records
/// - `PartialEq`: Transition lookup and no-op detection compare states
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: Records holding states are persisted
///
/// # Example
///
/// ```rust
/// use statekeeper::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum OrderStatus {
///     Pending,
///     Shipped,
///     Delivered,
/// }
///
/// impl State for OrderStatus {
///     fn name(&self) -> &str {
///         match self {
///             Self::Pending => "pending",
///             Self::Shipped => "shipped",
///             Self::Delivered => "delivered",
///         }
///     }
/// }
///
/// assert_eq!(OrderStatus::Shipped.name(), "shipped");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

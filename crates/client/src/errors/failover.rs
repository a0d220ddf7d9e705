/// Classification for failover policy.
///
/// Used by the resolution client to decide whether a primary failure should
/// move the client over to the secondary registry.
///
/// # Behavior Summary
///
/// | Class | Switch to secondary? |
/// |-------|----------------------|
/// | `Never` | No, the error is surfaced to the caller |
/// | `Failover` | Yes, and the switch is sticky |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailoverClass {
    /// Never fail over - bad input or a configuration problem.
    /// Another backend would fail the same way.
    Never,

    /// The backend is unreachable or reported a logical failure.
    /// Try the secondary registry and keep using it afterwards.
    Failover,
}

/// Opaque payload agreed upon by an instance.
///
/// Never inspected by the protocol: acceptors store it, proposers carry it,
/// and only ballots are ever compared.
pub trait Value: std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> Value for T where T: std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Clone
    + Send
    + Sync
    + 'static
{
}

/// Lifecycle of a single instance. Never reverts once `Decided`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Undecided,
    Decided,
}

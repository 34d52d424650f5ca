//! DescriptorProvider port - 購読一覧の供給元

use crate::domain::SubscriptionDescriptor;

/// Supplies the subscription descriptors once at startup.
///
/// The order of the returned list is the registration order; wildcard ties
/// are broken by it under `WildcardPrecedence::RegistrationOrder`.
pub trait DescriptorProvider: Send + Sync {
    fn enumerate(&self) -> Vec<SubscriptionDescriptor>;
}

//! StaticDescriptorProvider - 明示登録された固定の購読一覧

use crate::domain::SubscriptionDescriptor;
use crate::ports::DescriptorProvider;

#[derive(Debug, Clone, Default)]
pub struct StaticDescriptorProvider {
    descriptors: Vec<SubscriptionDescriptor>,
}

impl StaticDescriptorProvider {
    pub fn new(descriptors: Vec<SubscriptionDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DescriptorProvider for StaticDescriptorProvider {
    fn enumerate(&self) -> Vec<SubscriptionDescriptor> {
        self.descriptors.clone()
    }
}

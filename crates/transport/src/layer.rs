/// One of the four transport layers a request can be routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Onion,
    Lokinet,
    NativeLokinet,
    Direct,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Onion,
        Layer::Lokinet,
        Layer::NativeLokinet,
        Layer::Direct,
    ];

    fn bit(self) -> u8 {
        match self {
            Layer::Onion => 0b0001,
            Layer::Lokinet => 0b0010,
            Layer::NativeLokinet => 0b0100,
            Layer::Direct => 0b1000,
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layer::Onion => "onion",
            Layer::Lokinet => "lokinet",
            Layer::NativeLokinet => "native_lokinet",
            Layer::Direct => "direct",
        };
        write!(f, "{name}")
    }
}

/// A bitmask over [`Layer`], matching the "dispatcher holds a bitmask, not a
/// collection of heterogeneous objects" design note — selecting which
/// transports are active for a given call is a `u8` comparison, not a `Vec`
/// of trait objects to filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSet(u8);

impl LayerSet {
    pub const EMPTY: LayerSet = LayerSet(0);

    pub fn single(layer: Layer) -> Self {
        Self(layer.bit())
    }

    pub fn from_layers(layers: impl IntoIterator<Item = Layer>) -> Self {
        layers.into_iter().fold(Self::EMPTY, |acc, l| acc.insert(l))
    }

    #[must_use]
    pub fn insert(self, layer: Layer) -> Self {
        Self(self.0 | layer.bit())
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled layers, in the fixed order `Layer::ALL` — dispatch fan-out
    /// order is deterministic even though completion order is not.
    pub fn iter(self) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl Default for LayerSet {
    /// Spec default: onion only.
    fn default() -> Self {
        Self::single(Layer::Onion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_onion_only() {
        let set = LayerSet::default();
        assert!(set.contains(Layer::Onion));
        assert!(!set.contains(Layer::Lokinet));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_and_iterate_preserves_all_layer_order() {
        let set = LayerSet::EMPTY.insert(Layer::Direct).insert(Layer::Onion);
        let layers: Vec<_> = set.iter().collect();
        assert_eq!(layers, vec![Layer::Onion, Layer::Direct]);
    }

    #[test]
    fn from_layers_matches_manual_insert() {
        let a = LayerSet::from_layers([Layer::Lokinet, Layer::NativeLokinet]);
        let b = LayerSet::EMPTY.insert(Layer::Lokinet).insert(Layer::NativeLokinet);
        assert_eq!(a, b);
    }
}

// Embedding options, fixed at construction.

/// How the embedding surface is attached to the component tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filiation {
    /// Child of the proxy, sized by the proxy's layout.
    Direct,
    /// In the window's layered pane at the lowest layer, bounds follow the proxy.
    #[default]
    Proxied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub filiation: Filiation,
    /// When false the native peer is never clipped and capture is unsupported.
    pub visibility_constrained: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self { filiation: Filiation::default(), visibility_constrained: true }
    }
}

impl EmbedOptions {
    pub fn filiation(mut self, filiation: Filiation) -> Self {
        self.filiation = filiation;
        self
    }

    pub fn visibility_constrained(mut self, constrained: bool) -> Self {
        self.visibility_constrained = constrained;
        self
    }

    pub fn is_proxied(&self) -> bool {
        self.filiation == Filiation::Proxied
    }
}

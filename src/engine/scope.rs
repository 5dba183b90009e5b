use crate::graph::GraphLike;

/// The two sides of a move.
///
/// A move within one graph uses [`Scopes::Shared`]: both sides resolve to
/// the same graph, so every existence check on the target already sees the
/// mutations made through the source.
pub enum Scopes<'a, G> {
    Split { source: &'a mut G, target: &'a mut G },
    Shared(&'a mut G),
}

impl<'a, G: GraphLike> Scopes<'a, G> {
    pub fn split(source: &'a mut G, target: &'a mut G) -> Self {
        Scopes::Split { source, target }
    }

    pub fn shared(graph: &'a mut G) -> Self {
        Scopes::Shared(graph)
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Scopes::Shared(_))
    }

    pub fn source(&mut self) -> &mut G {
        match self {
            Scopes::Split { source, .. } => &mut **source,
            Scopes::Shared(graph) => &mut **graph,
        }
    }

    pub fn target(&mut self) -> &mut G {
        match self {
            Scopes::Split { target, .. } => &mut **target,
            Scopes::Shared(graph) => &mut **graph,
        }
    }
}

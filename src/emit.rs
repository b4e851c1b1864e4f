//! Shader code emission.
//!
//! Turns a [`ShaderGenome`] into one GLSL-style statement per node, in
//! topological order. Each node becomes a variable `_<index>`; every input
//! slot receives the weighted sum of every connection gene feeding it,
//! disabled genes included.

use crate::genome::ShaderGenome;

/// Render a single weighted operand term, e.g. `_2*2.0000000000`.
#[inline]
#[must_use]
pub fn weighted_term(source: usize, weight: f64) -> String {
    format!("_{}*{:.10}", source, weight)
}

impl ShaderGenome {
    /// Generate the shader body.
    ///
    /// Produces one `<type> _<index>=<expression>;` line per node, unreferenced
    /// nodes included. Returns an empty program if the genes admit no
    /// topological order.
    #[must_use]
    pub fn emit_code(&self) -> Vec<String> {
        let Some(order) = self.topological_order() else {
            return Vec::new();
        };

        order
            .into_iter()
            .map(|index| {
                let node = &self.nodes[index];

                let mut slots: Vec<Vec<String>> = vec![Vec::new(); node.arity()];
                for conn in self.connections.iter().filter(|c| c.target == index) {
                    if let Some(terms) = slots.get_mut(conn.slot) {
                        terms.push(weighted_term(conn.source, conn.weight));
                    }
                }

                let operands: Vec<String> = slots.iter().map(|terms| terms.join("+")).collect();
                format!("{} _{}={};", node.output_type(), index, node.render(&operands))
            })
            .collect()
    }
}

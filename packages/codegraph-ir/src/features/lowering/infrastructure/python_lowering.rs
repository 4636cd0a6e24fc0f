//! Python Expression Lowering - L1 (Expression IR) -> L2 (Node IR)
//!
//! Only expression kinds that denote a standing declaration or call site
//! get a Node in the closed vocabulary (`Call` for calls/instantiation,
//! `Lambda` for lambda literals); everything else (operators, literals,
//! attribute/subscript access, comprehensions) stays purely in the
//! Expression tree and is never promoted to a graph node. Reads edges are
//! only emitted between expressions that both produced a node.

use crate::features::lowering::domain::{ExpressionLowering, LoweringContext};
use crate::shared::models::{Edge, EdgeKind, Expression, ExpressionIR, ExprKind, Node, NodeKind, Result};

pub struct PythonExpressionLowering;

impl PythonExpressionLowering {
    pub fn new() -> Self {
        Self
    }

    /// Lower a single expression, registering a node only if its kind
    /// warrants one in the closed vocabulary.
    fn lower_expr(&self, expr: &Expression, ctx: &mut LoweringContext) {
        let node_kind = match Self::node_kind_for(&expr.kind) {
            Some(kind) => kind,
            None => return,
        };

        let node_id = ctx.next_node_id();
        let fqn = expr
            .symbol_fqn
            .clone()
            .unwrap_or_else(|| format!("{}#expr{}", expr.file_path, expr.id));

        let mut node = Node::new(node_id.clone(), node_kind, fqn, expr.file_path.clone(), expr.span.clone());
        if let Some(inferred) = &expr.inferred_type {
            node.set_attr("inferred_type", serde_json::Value::String(inferred.clone()));
        }

        ctx.register_mapping(expr.id, node_id.clone());
        ctx.add_node(node);

        for &read_expr_id in &expr.reads {
            if let Some(read_node_id) = ctx.get_node_id(read_expr_id).cloned() {
                ctx.add_edge(Edge::new(node_id.clone(), read_node_id, EdgeKind::Reads));
            }
        }
    }

    /// Map ExprKind onto the closed Node vocabulary; `None` means the
    /// expression stays Expression-only.
    fn node_kind_for(kind: &ExprKind) -> Option<NodeKind> {
        match kind {
            ExprKind::Call | ExprKind::Instantiate => Some(NodeKind::Call),
            ExprKind::Lambda => Some(NodeKind::Lambda),
            ExprKind::NameLoad
            | ExprKind::Attribute
            | ExprKind::Subscript
            | ExprKind::BinOp(_)
            | ExprKind::UnaryOp(_)
            | ExprKind::Compare(_)
            | ExprKind::BoolOp(_)
            | ExprKind::Literal(_)
            | ExprKind::Collection(_)
            | ExprKind::Assign
            | ExprKind::Comprehension
            | ExprKind::Conditional => None,
        }
    }
}

impl ExpressionLowering for PythonExpressionLowering {
    fn lower(&self, expr_ir: &ExpressionIR) -> Result<(Vec<Node>, Vec<Edge>)> {
        let mut ctx = LoweringContext::new();

        for expr in &expr_ir.expressions {
            self.lower_expr(expr, &mut ctx);
        }

        Ok((ctx.nodes, ctx.edges))
    }

    fn lower_expression(&self, expr: &Expression) -> Result<Vec<Node>> {
        let mut ctx = LoweringContext::new();
        self.lower_expr(expr, &mut ctx);
        Ok(ctx.nodes)
    }
}

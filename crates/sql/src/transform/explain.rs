use super::TransformNode;

/// One-line human description of a transform step.
pub fn explain_step(step: &TransformNode) -> String {
    match step {
        TransformNode::RowFilter(n) => format!("RowFilter: filter by {}", n.predicate),
        TransformNode::ColumnProjection(n) => {
            format!("ColumnProjection: project [{}]", n.columns.join(", "))
        }
        TransformNode::ColumnAddition(n) => {
            format!("ColumnAddition: add {} = {}", n.name, n.expression)
        }
        TransformNode::ColumnRename(n) => {
            let renames = n
                .mapping
                .iter()
                .map(|(old, new)| format!("{}->{}", old, new))
                .collect::<Vec<_>>()
                .join(", ");
            format!("ColumnRename: {}", renames)
        }
        TransformNode::GroupAggregate(n) => {
            let aggs = n
                .aggregates
                .iter()
                .map(|(name, expr)| format!("{}={}", name, expr))
                .collect::<Vec<_>>()
                .join(", ");
            format!("GroupAggregate: by [{}] with {}", n.keys.join(", "), aggs)
        }
        TransformNode::Join(n) => {
            let on = n
                .on
                .iter()
                .map(|(l, r)| format!("{}={}", l, r))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Join: {} join on {}", n.kind, on)
        }
        TransformNode::Pivot(n) => format!(
            "Pivot: {} -> columns, values from {}",
            n.pivot_column, n.value_column
        ),
        TransformNode::Unpivot(n) => format!(
            "Unpivot: [{}] -> {}, {}",
            n.columns.join(", "),
            n.attribute_column,
            n.value_column
        ),
        TransformNode::Buffer(_) => "Buffer: materialize table (prevent query folding)".to_string(),
    }
}

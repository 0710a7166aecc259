//! Check-constraint pairing between the two sides of a table
//!
//! Constraint ids were not always carried over one-to-one, so pairing by id is
//! followed by a positional pass over whatever is left: the k-th unpaired
//! source constraint goes with the k-th unpaired target constraint.

use serde::Serialize;
use std::collections::HashMap;

use crate::schema::types::{CheckConstraint, DatabaseSchema};
use crate::schema::validation::ValidationError;
use crate::utils::naming::same_identifier;

/// One row of the side-by-side check-constraint view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckConstraintRow {
    /// `cc<n>`, 1-based row position; addresses the row without using ids
    pub delete_index: String,
    pub source: Option<CheckConstraint>,
    pub target: Option<CheckConstraint>,
}

/// Pair source and target constraints.
///
/// Rows follow source declaration order; target constraints left without a
/// partner come last, in target order.
pub fn pair_check_constraints(
    source: &[CheckConstraint],
    target: &[CheckConstraint],
) -> Vec<CheckConstraintRow> {
    let target_positions: HashMap<&str, usize> = target
        .iter()
        .enumerate()
        .map(|(i, cc)| (cc.id.as_str(), i))
        .collect();

    let mut partner: Vec<Option<usize>> = vec![None; source.len()];
    let mut taken = vec![false; target.len()];

    for (i, cc) in source.iter().enumerate() {
        if let Some(&j) = target_positions.get(cc.id.as_str()) {
            if !taken[j] {
                partner[i] = Some(j);
                taken[j] = true;
            }
        }
    }

    let unpaired_source = (0..source.len()).filter(|&i| partner[i].is_none()).collect::<Vec<_>>();
    let unpaired_target = (0..target.len()).filter(|&j| !taken[j]).collect::<Vec<_>>();
    for (&i, &j) in unpaired_source.iter().zip(unpaired_target.iter()) {
        partner[i] = Some(j);
        taken[j] = true;
    }

    let mut rows: Vec<CheckConstraintRow> = source
        .iter()
        .zip(partner)
        .map(|(cc, j)| (Some(cc.clone()), j.map(|j| target[j].clone())))
        .chain(
            target
                .iter()
                .zip(taken)
                .filter(|(_, taken)| !taken)
                .map(|(cc, _)| (None, Some(cc.clone()))),
        )
        .map(|(source, target)| CheckConstraintRow {
            delete_index: String::new(),
            source,
            target,
        })
        .collect();

    for (i, row) in rows.iter_mut().enumerate() {
        row.delete_index = format!("cc{}", i + 1);
    }
    rows
}

/// Check-constraint rows for one table; an unknown table on either side
/// contributes no constraints.
pub fn check_constraint_mapping(
    source: &DatabaseSchema,
    target: &DatabaseSchema,
    table_id: &str,
) -> Vec<CheckConstraintRow> {
    let empty = Vec::new();
    let source_list = source.table(table_id).map_or(&empty, |t| &t.check_constraints);
    let target_list = target.table(table_id).map_or(&empty, |t| &t.check_constraints);

    pair_check_constraints(source_list, target_list)
}

/// Drop the row addressed by `delete_index`; the other rows keep their tokens
pub fn remove_row(rows: &[CheckConstraintRow], delete_index: &str) -> Vec<CheckConstraintRow> {
    rows.iter()
        .filter(|row| row.delete_index != delete_index)
        .cloned()
        .collect()
}

/// Reject a target constraint set that defines the same name and condition twice
pub fn validate_check_constraints(proposed: &[CheckConstraint]) -> Result<(), ValidationError> {
    for (i, cc) in proposed.iter().enumerate() {
        let duplicate = proposed[i + 1..].iter().any(|other| {
            same_identifier(&cc.name, &other.name) && cc.expression.trim() == other.expression.trim()
        });

        if duplicate {
            tracing::info!(name = %cc.name, "Rejected duplicate check constraint");
            return Err(ValidationError::DuplicateCheckConstraint {
                name: cc.name.clone(),
                expression: cc.expression.clone(),
            });
        }
    }

    Ok(())
}

/// Target constraints of an edited row set, after validation
pub fn edited_target_constraints(rows: &[CheckConstraintRow]) -> Result<Vec<CheckConstraint>, ValidationError> {
    let proposed: Vec<CheckConstraint> = rows.iter().filter_map(|row| row.target.clone()).collect();
    validate_check_constraints(&proposed)?;
    Ok(proposed)
}

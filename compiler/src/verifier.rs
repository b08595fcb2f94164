use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::{
    error::SercError,
    init_value::{Argument, InitialValue},
    structure::{Structure, RESERVED_NAMES},
    utils::quote,
};

/// Checks the relations between compiled structures that a single
/// structure cannot check on its own.
///
/// - structure type names are unique;
/// - every referenced structure exists somewhere in the list;
/// - a structure embedded by value is declared earlier than its container,
///   which also rules out recursive nesting.
pub fn verify_structures(structures: &[Structure]) -> Result<(), SercError> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (i, structure) in structures.iter().enumerate() {
        if positions.insert(&structure.type_name, i).is_some() {
            return Err(SercError::parse(format!(
                "The structure {} is defined twice",
                quote(&structure.type_name)
            ))
            .at_structure(&structure.type_name));
        }
    }

    for (i, structure) in structures.iter().enumerate() {
        for member in &structure.members {
            let located = |err: SercError| err.at_member(&member.name).at_structure(&structure.type_name);

            for referenced in member.ty.referenced_structures() {
                if !positions.contains_key(referenced) {
                    return Err(located(SercError::parse(format!(
                        "The structure {} is not defined",
                        quote(referenced)
                    ))));
                }
            }

            let Some(contained) = member.ty.contained_structure() else {
                continue;
            };
            let position = positions[contained];
            if position == i {
                return Err(located(SercError::parse(format!(
                    "Recursive nesting of {} is not allowed",
                    quote(contained)
                ))));
            }
            if position > i {
                return Err(located(SercError::parse(format!(
                    "The structure {} must be declared before {} to be embedded by value",
                    quote(contained),
                    quote(&structure.type_name)
                ))));
            }
        }
    }

    Ok(())
}

/// Passes the constructor arguments of every structure embedded by value
/// through its container's constructor, as `<member>_<argument>`.
///
/// Expects structures that passed [`verify_structures`]: embedded structures
/// come first, so their own forwarded arguments are already in place.
pub fn link_structures(structures: &mut [Structure]) -> Result<(), SercError> {
    for i in 0..structures.len() {
        let (earlier, rest) = structures.split_at_mut(i);
        let structure = &mut rest[0];

        for member in &mut structure.members {
            let Some(contained) = member.ty.contained_structure() else {
                continue;
            };
            let Some(nested) = earlier.iter().find(|s| s.type_name == contained) else {
                continue;
            };
            let arguments: Vec<Argument> = nested
                .member_arguments()
                .into_iter()
                .map(|arg| Argument::new(arg.c_type, format!("{}_{}", member.name, arg.name)))
                .collect();
            if !arguments.is_empty() {
                trace!(member = %member.name, forwarded = arguments.len(), "forwarding constructor arguments");
                member.init = InitialValue::Forwarded { arguments };
            }
        }

        let mut seen = HashSet::new();
        for member in &structure.members {
            for arg in member.required_arguments() {
                let clash = if RESERVED_NAMES.contains(&arg.name.as_str()) {
                    "is reserved by the generated functions"
                } else if !seen.insert(arg.name.clone()) {
                    "is used twice"
                } else {
                    continue;
                };
                return Err(SercError::parse(format!("Constructor argument {} {}", quote(&arg.name), clash))
                    .at_member(&member.name)
                    .at_structure(&structure.type_name));
            }
        }
    }

    Ok(())
}

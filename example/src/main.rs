// example/src/main.rs

use serc::*;

const SENSOR_SCHEMA: &str = include_str!("../schemas/sensor.json");

fn main() -> Result<(), SercError> {
    let schema = decode_schema(SENSOR_SCHEMA)?;
    let compiled = compile_schema(&schema)?;

    // A short summary of what the compiler resolved for each structure
    for structure in &compiled.structures {
        let args: Vec<String> = structure
            .required_arguments()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{}({})", structure.type_name, args.join(", "));

        for member in &structure.members {
            let source = match &member.init {
                InitialValue::Argument { .. } => "argument".to_string(),
                InitialValue::Constant { value } => format!("constant {}", value),
                InitialValue::Intrinsic => "self-initialized".to_string(),
            };
            println!(
                "  {:<14} {:<10} size {:<28} {}",
                member.name,
                member.c_type(),
                member.size_expr(),
                source
            );
        }
    }

    println!();
    print!("{}", generate_c(&compiled));

    Ok(())
}

mod demo;
mod logger;

use std::path::PathBuf;

use catena::{Device, DeviceModel, ParamError, Result, Value};
use clap::Parser;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "catena-dump", about = "Load a device, apply changes and print its document")]
struct Args {
    /// Device model as JSON; the built-in demo device is used otherwise
    #[arg(short, long)]
    model: Option<PathBuf>,
    #[arg(short, long)]
    slot: Option<u32>,
    /// YAML value-override file
    #[arg(short, long)]
    overrides: Option<PathBuf>,
    /// Stage and commit a value, e.g. `--set audio/gain=-6.5`
    #[arg(long = "set", value_name = "OID=VALUE")]
    set: Vec<String>,
    /// Print the value at an OID
    #[arg(long = "get", value_name = "OID")]
    get: Vec<String>,
    /// Run a demo command, e.g. `--invoke reverse=hello`
    #[arg(long = "invoke", value_name = "OID=VALUE")]
    invoke: Vec<String>,
    /// List every parameter OID
    #[arg(short, long)]
    list: bool,
    #[arg(long)]
    json_logs: bool,
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_logger(args.json_logs, args.debug);

    let mut device = match &args.model {
        Some(path) => {
            let mut model = DeviceModel::from_json_file(path)?;
            if let Some(slot) = args.slot {
                model.slot = slot;
            }
            Device::from_model(model)?
        }
        None => demo::build_demo_device(args.slot.unwrap_or(1))?,
    };

    if let Some(path) = &args.overrides {
        device.apply_override_file(path)?;
    }

    let updates = device.subscribe();
    for assignment in &args.set {
        let (oid, value) = parse_assignment(assignment)?;
        device.set_value(&oid, None, value)?;
    }
    device.commit()?;
    for update in updates.try_iter() {
        debug!(
            "[DEVICE] Push slot {} {} = {:?}",
            update.slot, update.oid, update.value
        );
    }

    let mut queried = false;
    for assignment in &args.invoke {
        queried = true;
        let (oid, payload) = parse_assignment(assignment)?;
        let command = device.command(&oid)?;
        info!("[DEVICE] Invoking {} (responds: {})", oid, command.response);
        match demo::execute_command(&oid, payload) {
            Some(response) if command.response => {
                println!("{} -> {}", oid, to_json(&response)?);
            }
            Some(_) => {}
            None => {
                return Err(ParamError::InvalidConfig(format!(
                    "Cannot execute '{}'",
                    oid
                )));
            }
        }
    }
    for oid in &args.get {
        queried = true;
        let value = device.get_value(oid, None)?;
        println!("{} = {}", oid, to_json(&value)?);
    }
    if args.list {
        queried = true;
        for oid in device.params().oids() {
            println!("{}", oid);
        }
    }

    if !queried {
        println!("{}", device.model()?.to_json()?);
    }
    Ok(())
}

fn to_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Split `oid=value`.
fn parse_assignment(text: &str) -> Result<(String, Value)> {
    let (oid, value) = text.split_once('=').ok_or_else(|| {
        ParamError::InvalidConfig(format!("Expected OID=VALUE, got '{}'", text))
    })?;
    Ok((oid.trim().to_string(), parse_value(value.trim())?))
}

/// Integers, then floats, then tagged JSON (`{"struct_value": ...}`), then
/// plain strings.
fn parse_value(text: &str) -> Result<Value> {
    if let Ok(v) = text.parse::<i32>() {
        return Ok(Value::Int32(v));
    }
    if let Ok(v) = text.parse::<f32>() {
        return Ok(Value::Float32(v));
    }
    if text.starts_with('{') {
        return Ok(serde_json::from_str(text)?);
    }
    Ok(Value::String(text.to_string()))
}

//! The built-in demo device used when no model file is given.

use catena::constraint::{float32_range, int32_choice, int32_range, string_choice};
use catena::payload::DataPayload;
use catena::{Device, ParamDescriptor, ParamType, Result, StructValue, Value};

pub fn build_demo_device(slot: u32) -> Result<Device> {
    let mut device = Device::new(slot);
    device.set_default_scope("monitor");

    build_params(&mut device)?;
    build_commands(&mut device)?;
    build_menus(&mut device);

    device.commit()?;
    Ok(device)
}

fn build_params(device: &mut Device) -> Result<()> {
    let params = device.params_mut();

    params
        .create_param_descriptor(
            "display_name",
            ParamDescriptor::new("Display Name", ParamType::String)
                .with_value("My Catena Device")
                .with_widget("TEXT_DISPLAY"),
        )?
        .add_oid_alias("0xFF01");

    params
        .create_param_descriptor(
            "product_name",
            ParamDescriptor::new("Product Name", ParamType::String)
                .with_value("Catena Demo")
                .read_only(true),
        )?
        .add_oid_alias("0x105");

    params.create_param_descriptor(
        "float_example",
        ParamDescriptor::new("Float Example", ParamType::Float32)
            .with_value(50.0f32)
            .with_precision(2)
            .with_constraint(float32_range(0.0, 100.0, 0.0))
            .with_widget("SLIDER"),
    )?;

    params.create_param_descriptor(
        "number_example",
        ParamDescriptor::new("Number Example", ParamType::Int32)
            .with_value(5)
            .with_constraint(int32_range(0, 10, 1))
            .with_widget("SPINNER"),
    )?;

    params.create_param_descriptor(
        "choice_example",
        ParamDescriptor::new("Choice Example", ParamType::Int32)
            .with_value(0)
            .with_constraint(int32_choice(&["Choice 1", "Choice 2", "Choice 3"]))
            .with_widget("COMBO_BOX"),
    )?;

    params.create_param_descriptor(
        "audio/gain",
        ParamDescriptor::new("Gain", ParamType::Float32)
            .with_value(0.0f32)
            .with_constraint(float32_range(-60.0, 12.0, 0.5))
            .with_widget("FADER"),
    )?;
    params.create_param_descriptor(
        "audio/mute",
        ParamDescriptor::new("Mute", ParamType::Int32)
            .with_value(0)
            .with_constraint(int32_range(0, 1, 1))
            .with_widget("TOGGLE"),
    )?;
    params.create_param_descriptor(
        "audio/source",
        ParamDescriptor::new("Source", ParamType::String)
            .with_value("mic")
            .with_constraint(string_choice(&["mic", "line", "aes"], true)),
    )?;
    params.create_or_get_param("audio")?.name = catena::text::simple_text("Audio");

    let channels = vec![
        StructValue::default()
            .with_value("name", "Left")
            .with_value("level", 3),
        StructValue::default()
            .with_value("name", "Right")
            .with_value("level", 4),
    ];
    params
        .create_param_descriptor(
            "channels",
            ParamDescriptor::new("Channels", ParamType::StructArray)
                .with_value(Value::StructArray(channels))
                .with_widget("TABLE"),
        )?;
    params.create_param_descriptor(
        "channels/name",
        ParamDescriptor::new("Name", ParamType::String),
    )?;
    params.create_param_descriptor(
        "channels/level",
        ParamDescriptor::new("Level", ParamType::Int32).with_constraint(int32_range(0, 10, 1)),
    )?;

    Ok(())
}

fn build_commands(device: &mut Device) -> Result<()> {
    let commands = device.commands_mut();

    commands.create_param_descriptor(
        "foo",
        ParamDescriptor::new("Foo", ParamType::String).with_widget("BUTTON"),
    )?;
    commands.create_param_descriptor(
        "reverse",
        ParamDescriptor::new("Reverse", ParamType::String),
    )?;
    commands.create_param_descriptor(
        "file_receive",
        ParamDescriptor::new("Receive File", ParamType::Data).with_widget("FILE_CHOOSER"),
    )?;
    commands
        .create_param_descriptor(
            "file_transmit",
            ParamDescriptor::new("Transmit File", ParamType::Data).with_value(
                DataPayload::from_bytes("hello.txt", "text/plain", b"Hello, Catena!".to_vec()),
            ),
        )?;
    commands.create_param_descriptor("reset", ParamDescriptor::new("Reset", ParamType::Empty))?;
    commands.set_responds("reset", false)?;

    Ok(())
}

fn build_menus(device: &mut Device) {
    let menus = device.menus_mut();

    menus.create_menu_group("status", 0, "Status");
    menus.create_menu("status", "info", 0, "Info");
    menus.add_params_menu("status", "info", &["display_name", "product_name"]);

    menus.create_menu_group("config", 1, "Config");
    menus.create_menu("config", "settings", 0, "Settings");
    menus.add_params_menu(
        "config",
        "settings",
        &["float_example", "number_example", "choice_example"],
    );
    menus.create_menu("config", "audio", 1, "Audio");
    menus.add_params_menu("config", "audio", &["audio", "channels"]);
    menus.add_commands_menu("config", "audio", &["reverse", "file_receive", "file_transmit"]);
}

/// Run one of the demo commands against its payload.
pub fn execute_command(oid: &str, payload: Value) -> Option<Value> {
    match (oid, payload) {
        ("foo", Value::String(s)) => Some(Value::String(format!("You said: {}", s))),
        ("reverse", Value::String(s)) => Some(Value::String(s.chars().rev().collect())),
        ("file_transmit", _) => Some(Value::Data(DataPayload::from_bytes(
            "hello.txt",
            "text/plain",
            b"Hello, Catena!".to_vec(),
        ))),
        ("file_receive", Value::Data(data)) => {
            let accepted = data.verify_digest();
            Some(Value::Int32(i32::from(accepted)))
        }
        _ => None,
    }
}

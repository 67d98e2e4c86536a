use bcf_core::commands::{CommandRegistry, CommandResult, ExecutionContext, Value};
use bcf_core::EngineConfig;
use std::sync::Mutex;

/// Environment that remembers every handler call made on its behalf.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<(String, Vec<Value>)> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

pub fn record(
    name: &'static str,
) -> impl Fn(&mut ExecutionContext<'_, Recorder>) -> CommandResult<()> + Send + Sync + 'static {
    move |ctx| {
        let args = ctx.args().iter().cloned().collect();
        ctx.env().calls.lock().unwrap().push((name.to_string(), args));
        Ok(())
    }
}

pub fn call(name: &str, args: Vec<Value>) -> (String, Vec<Value>) {
    (name.to_string(), args)
}

pub fn shop() -> CommandRegistry<Recorder> {
    shop_with_config(EngineConfig::default())
}

pub fn shop_with_config(config: EngineConfig) -> CommandRegistry<Recorder> {
    let mut registry = CommandRegistry::with_config(config);
    registry
        .command("shop|s")
        .on_default("", record("help"))
        .on_error("", record("error"))
        .on_execute("list", 0, record("list"))
        .on_execute("buy @string @int(min=1, max=64, default=1)", 2, record("buy"))
        .on_execute(
            "sell @string(switch=currency|c, default=gold) @string @int(min=1, max=64)",
            3,
            record("sell"),
        )
        // Parameters end a segment, so each parameterized literal gets its own path.
        .on_execute("price set(suppress=false) @string @double(min=0)", 3, record("price"))
        .on_execute("price add(suppress=false) @string @double(min=0)", 3, record("price"))
        .on_error("price", record("price-error"));
    registry
}

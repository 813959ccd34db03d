/// Macro to generate a JSON schema from a type
#[macro_export]
macro_rules! schema_from_type {
    ($type:ty) => {{
        #[allow(clippy::panic)]
        let schema = match ::rmcp::serde_json::to_value(::rmcp::schemars::schema_for!($type)) {
            Ok(::rmcp::serde_json::Value::Object(schema)) => schema,
            _ => panic!("Failed to generate schema for {}", stringify!($type)),
        };
        schema
    }};
}

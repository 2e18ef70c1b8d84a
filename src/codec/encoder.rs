use crate::value::{SessionData, Value};

/// Encode session data to the persisted byte form.
///
/// An empty map encodes to the empty string. Entries are written in map
/// order; the decoder does not care about ordering. Lists and maps carry
/// distinct tags (`a:` / `m:`) so the empty cases stay distinguishable.
pub fn encode(data: &SessionData) -> String {
    let mut out = String::new();

    for (key, value) in data {
        out.push_str(key);
        out.push('|');
        write_value(&mut out, value);
    }

    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("N;"),
        Value::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
        Value::Int(i) => {
            out.push_str("i:");
            out.push_str(&i.to_string());
            out.push(';');
        }
        Value::Str(s) => write_str(out, s),
        Value::List(items) => {
            out.push_str("a:");
            out.push_str(&items.len().to_string());
            out.push_str(":{");
            for (index, item) in items.iter().enumerate() {
                out.push_str("i:");
                out.push_str(&index.to_string());
                out.push(';');
                write_value(out, item);
            }
            out.push('}');
        }
        Value::Map(map) => {
            out.push_str("m:");
            out.push_str(&map.len().to_string());
            out.push_str(":{");
            for (key, item) in map {
                write_str(out, key);
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_str(out: &mut String, s: &str) {
    out.push_str("s:");
    out.push_str(&s.len().to_string());
    out.push_str(":\"");
    out.push_str(s);
    out.push_str("\";");
}

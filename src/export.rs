use crate::domain::Subscriber;

const COLUMNS: [&str; 3] = ["name", "email", "categories"];
const LINE_TERMINATOR: &str = "\r\n";

/// Renders subscribers as CSV: a `name,email,categories` header followed by
/// one row per subscriber, categories joined with `", "`.
pub fn render_csv(subscribers: &[Subscriber]) -> String {
    let mut out = String::new();
    push_record(&mut out, &COLUMNS);
    for subscriber in subscribers {
        let categories = subscriber.categories.joined();
        push_record(
            &mut out,
            &[
                subscriber.name.as_str(),
                subscriber.email.as_str(),
                categories.as_str(),
            ],
        );
    }
    out
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str(LINE_TERMINATOR);
}

// Quote only when needed, doubling embedded quotes.
fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n'));
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}

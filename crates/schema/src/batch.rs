//! Splitting a multi-statement schema definition.

/// Split `batch` on `;`, ignoring semicolons inside quotes and comments.
///
/// Comments are dropped and empty statements skipped. Each returned
/// statement is trimmed and carries no trailing `;`.
pub fn split_statements(batch: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = batch.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                // A doubled quote closes and immediately reopens.
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            ';' => flush(&mut statements, &mut current),
            '-' if chars.peek() == Some(&'-') => skip_line(&mut chars, &mut current),
            '#' => skip_line(&mut chars, &mut current),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                current.push(' ');
            }
            _ => current.push(c),
        }
    }
    flush(&mut statements, &mut current);
    statements
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, current: &mut String) {
    for c in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
    current.push('\n');
}

fn flush(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

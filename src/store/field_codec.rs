/// 取一行记录中的第 field_index 个字段（从1开始）
///
/// 引号内的逗号不作为分隔符，起止引号会被去掉；连续两个引号视为字面内容原样保留，不做反转义。
/// 行内字段数不足时返回 None，和“字段存在但为空”区分开。
pub fn get_field(line: &str, field_index: usize) -> Option<String> {
    let mut current = 1;
    let mut in_quotes = false;
    let mut field = String::new();

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                if current == field_index {
                    field.push_str("\"\"");
                }
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                if current == field_index {
                    return Some(field);
                }
                current += 1;
                field.clear();
            }
            _ => {
                if current == field_index {
                    field.push(c);
                }
            }
        }
    }

    if current == field_index {
        let len = field.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
        field.truncate(len);
        return Some(field);
    }
    None
}

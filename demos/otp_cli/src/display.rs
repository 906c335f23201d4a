/// Size of the digit groups a code of `digits` characters is printed in,
/// or `None` when it is printed as a whole
pub fn group_size(digits: usize) -> Option<usize> {
    if digits % 3 == 0 {
        Some(3)
    } else if digits % 4 == 0 {
        Some(4)
    } else {
        None
    }
}

/// Formats a code for the terminal, optionally split into space separated groups
pub fn format_code(code: &str, inner_spaces: bool) -> String {
    let Some(size) = group_size(code.len()).filter(|_| inner_spaces) else {
        return code.to_string();
    };

    let mut formatted = String::with_capacity(code.len() + code.len() / size);
    for (index, digit) in code.chars().enumerate() {
        if index > 0 && index % size == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }

    formatted
}

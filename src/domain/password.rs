/// Strength rules applied to new passwords.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_numbers: bool,
    pub require_symbols: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 10,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_symbols: true,
        }
    }
}

const SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "123456789", "qwerty", "abc123", "password123", "admin", "letmein",
    "welcome", "monkey", "dragon", "password1", "123123", "sunshine", "master",
];

const SEQUENCES: &[&str] = &[
    "abcdefghijklmnopqrstuvwxyz",
    "0123456789",
    "qwertyuiop",
    "asdfghjkl",
    "zxcvbnm",
];

impl PasswordPolicy {
    /// Every rule the password breaks; empty when it is acceptable.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if self.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one number".to_string());
        }
        if self.require_symbols && !password.chars().any(|c| SYMBOLS.contains(c)) {
            errors.push("Password must contain at least one special character".to_string());
        }

        let lowered = password.to_lowercase();
        if COMMON_PASSWORDS.iter().any(|common| lowered.contains(common)) {
            errors.push("Password is too common and easily guessable".to_string());
        }
        if has_sequential_characters(&lowered) {
            errors.push("Password cannot contain sequential characters".to_string());
        }

        errors
    }
}

fn has_sequential_characters(lowered: &str) -> bool {
    SEQUENCES.iter().any(|sequence| {
        sequence
            .as_bytes()
            .windows(3)
            .filter_map(|w| std::str::from_utf8(w).ok())
            .any(|triple| lowered.contains(triple))
    })
}

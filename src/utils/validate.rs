use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{LmsError, Result};
use crate::models::users::requests::CreateUserRequest;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

const COMMON_PASSWORDS: [&str; 6] = [
    "password1",
    "qwerty123",
    "admin1234",
    "abcd1234",
    "welcome1",
    "letmein1",
];

pub fn validate_username(username: &str) -> std::result::Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 3-32 characters of letters, digits, dots, underscores or hyphens",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 不满足的密码规则，空表示通过
pub fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();

    if password.chars().count() < 8 {
        problems.push("at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("a digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        problems.push("not a common password");
    }

    problems
}

/// 创建用户前的字段校验
pub fn validate_new_user(req: &CreateUserRequest) -> Result<()> {
    validate_username(&req.username).map_err(LmsError::validation)?;
    validate_email(&req.email).map_err(LmsError::validation)?;

    let problems = password_problems(&req.password);
    if !problems.is_empty() {
        return Err(LmsError::validation(format!(
            "Password must contain {}",
            problems.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    fn request(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::Student,
            display_name: None,
        }
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ada.l").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(password_problems("Burette42").is_empty());
        assert_eq!(password_problems("Ab1"), vec!["at least 8 characters"]);
        assert!(password_problems("abcdefgh1").contains(&"an uppercase letter"));
        assert_eq!(password_problems("Password1"), vec!["not a common password"]);
        assert!(password_problems("Qwerty123").contains(&"not a common password"));
    }

    #[test]
    fn test_validate_new_user() {
        assert!(validate_new_user(&request("student1", "s1@school.edu", "Burette42")).is_ok());

        let err = validate_new_user(&request("student1", "not-an-email", "Burette42")).unwrap_err();
        assert_eq!(err.message(), "Email format is invalid");

        let err = validate_new_user(&request("student1", "s1@school.edu", "short")).unwrap_err();
        assert!(err.message().starts_with("Password must contain"));
    }
}

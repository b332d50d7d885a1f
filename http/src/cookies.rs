use crate::{Error, Result};
use std::{
    fmt::{self, Display, Formatter},
    time::SystemTime,
};

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|'
                | '~'
        )
}

/// A response cookie, serialised as one `Set-Cookie` header.
///
/// Cookie names are restricted to the RFC 6265 token alphabet. Optional
/// attributes are omitted from the string form when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    expires: Option<SystemTime>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
}

impl Cookie {
    /// Construct a cookie from a name and value.
    ///
    /// # Errors
    ///
    /// `Error::InvalidCookieName` when the name is empty or contains a
    /// character outside the RFC 6265 token alphabet.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || !name.chars().all(is_token_char) {
            return Err(Error::InvalidCookieName(name));
        }

        Ok(Self {
            name,
            value: value.into(),
            expires: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
        })
    }

    /// the cookie's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// the cookie's value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// the expiry, if one has been set
    pub fn expires(&self) -> Option<SystemTime> {
        self.expires
    }

    /// chainable setter for the `Expires` attribute
    #[must_use]
    pub fn with_expires(mut self, expires: SystemTime) -> Self {
        self.expires = Some(expires);
        self
    }

    /// chainable setter for the `Domain` attribute
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// chainable setter for the `Path` attribute
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// chainable setter for the `Secure` flag
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// chainable setter for the `HttpOnly` flag
    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Equality by name alone, the identity a [`CookieJar`] enforces.
    /// For equality across all attributes, use `==`.
    pub fn same_name(&self, other: &Cookie) -> bool {
        self.name == other.name
    }
}

impl Display for Cookie {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", httpdate::fmt_http_date(expires))?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        Ok(())
    }
}

/// The cookies attached to a response, unique by name.
///
/// Adding a cookie whose name is already present replaces the earlier
/// one. Like [`Headers`][crate::Headers], the jar can be latched
/// read-only with [`CookieJar::seal`]; the serialiser does this before
/// emitting one `Set-Cookie` header per cookie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct CookieJar {
    cookies: Vec<Cookie>,
    sealed: bool,
}

impl CookieJar {
    /// Construct a new empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch this jar read-only. There is deliberately no way back.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Has this jar been latched read-only?
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn guard(&self) -> Result<()> {
        if self.sealed {
            Err(Error::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Add a cookie, replacing any existing cookie with the same name.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the jar has been sealed.
    pub fn add(&mut self, cookie: Cookie) -> Result<()> {
        self.guard()?;
        match self.cookies.iter_mut().find(|c| c.same_name(&cookie)) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
        Ok(())
    }

    /// Remove and return the cookie with this name.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the jar has been sealed.
    pub fn remove(&mut self, name: &str) -> Result<Option<Cookie>> {
        self.guard()?;
        Ok(self
            .cookies
            .iter()
            .position(|c| c.name() == name)
            .map(|index| self.cookies.remove(index)))
    }

    /// Look up a cookie by name.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    /// Whether a cookie with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// How many cookies are in the jar?
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Are there zero cookies?
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Iterate the cookies in the order they were first added.
    pub fn iter(&self) -> std::slice::Iter<'_, Cookie> {
        self.cookies.iter()
    }
}

impl<'a> IntoIterator for &'a CookieJar {
    type Item = &'a Cookie;
    type IntoIter = std::slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}

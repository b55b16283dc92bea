use std::collections::HashMap;

/// A table for resolving type references to class names.
///
/// Maps simple class names to the fully-qualified names declaring them.
/// Example: "UserService" -> ["com.x.service.UserService"]
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    /// Map of simple name to FQNs, in insertion order
    by_simple: HashMap<String, Vec<String>>,

    /// Map of package to the FQNs it declares
    by_package: HashMap<String, Vec<String>>,
}

impl SymbolTable {
    /// Creates a new empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class. Re-registering is a no-op.
    ///
    /// * `fqn` - Fully Qualified Name (e.g., "com.x.Foo")
    /// * `simple` - The class's simple name
    /// * `package` - The declaring package
    pub fn insert(&mut self, fqn: &str, simple: &str, package: &str) {
        let fqns = self.by_simple.entry(simple.to_string()).or_default();
        if fqns.iter().any(|f| f == fqn) {
            return;
        }
        fqns.push(fqn.to_string());
        self.by_package
            .entry(package.to_string())
            .or_default()
            .push(fqn.to_string());
    }

    /// Resolves a type reference as written in source.
    ///
    /// A qualified reference must match an FQN exactly. A simple name
    /// resolves to a class in `package`, else to the one class declaring
    /// it. Ambiguous names resolve to nothing.
    pub fn resolve(&self, reference: &str, package: &str) -> Option<&str> {
        let simple = reference.rsplit('.').next().unwrap_or(reference);
        let candidates = self.by_simple.get(simple)?;

        if reference.contains('.') {
            // Qualified names never fall back to another package's class.
            return candidates
                .iter()
                .find(|f| f.as_str() == reference)
                .map(String::as_str);
        }
        if let Some(local) = self
            .by_package
            .get(package)
            .and_then(|fqns| fqns.iter().find(|f| candidates.contains(f)))
        {
            return Some(local);
        }
        match candidates.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Returns all FQNs declared with a simple name.
    pub fn candidates(&self, simple: &str) -> &[String] {
        self.by_simple.get(simple).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns all classes declared in a package.
    pub fn package_members(&self, package: &str) -> &[String] {
        self.by_package.get(package).map(Vec::as_slice).unwrap_or(&[])
    }
}

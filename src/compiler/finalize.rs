//! Post-generation renaming of duplicate top-level symbols.

use std::collections::HashMap;

use inkwell::{
    module::Module,
    values::{FunctionValue, GlobalValue},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Global,
    Function,
    Alias,
    IFunc,
}

/// A named top-level entity of a module.
pub trait Symbol {
    fn name(&self) -> String;
    fn set_name(&mut self, name: &str);
    fn kind(&self) -> SymbolKind;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub kind: SymbolKind,
    pub from: String,
    pub to: String,
}

/// Counts every name it has handed out and renames repeats.
#[derive(Debug, Default)]
pub struct Deduplicator {
    counter: HashMap<String, u64>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Deduplicator::default()
    }

    fn seen(&self, name: &str) -> bool {
        self.counter.get(name).is_some_and(|count| *count > 0)
    }

    fn count(&mut self, name: &str) {
        *self.counter.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Keeps the first symbol with a given name and renames every later one.
    ///
    /// A numeric name moves to the next number nobody has taken; anything
    /// else gets a `.n` suffix, starting from the number of times the name
    /// was seen.
    pub fn fix<S: Symbol + ?Sized>(&mut self, symbol: &mut S) -> Option<Rename> {
        let origin = symbol.name();
        let times = self.counter.get(&origin).copied().unwrap_or(0);

        if times == 0 {
            self.count(&origin);
            return None;
        }

        let renamed = if is_plain_number(&origin) {
            let mut next = increment_decimal(&origin);
            while self.seen(&next) {
                next = increment_decimal(&next);
            }
            next
        } else {
            let mut n = times;
            while self.seen(&format!("{}.{}", origin, n)) {
                n += 1;
            }
            self.count(&origin);
            format!("{}.{}", origin, n)
        };

        symbol.set_name(&renamed);
        self.count(&renamed);
        debug!(from = %origin, to = %renamed, "renamed duplicate symbol");

        Some(Rename {
            kind: symbol.kind(),
            from: origin,
            to: renamed,
        })
    }

    /// Runs [`Deduplicator::fix`] over symbols in discovery order.
    pub fn fix_all<S: Symbol>(&mut self, symbols: &mut [S]) -> Vec<Rename> {
        symbols
            .iter_mut()
            .filter_map(|symbol| self.fix(symbol))
            .collect()
    }
}

/// A non-negative integer in canonical form: ASCII digits with no sign and
/// no leading zero.
fn is_plain_number(name: &str) -> bool {
    match name.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        digits => digits.iter().all(u8::is_ascii_digit),
    }
}

/// Adds one to a decimal digit string. Works past `u64::MAX`.
fn increment_decimal(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }
    bytes.insert(0, b'1');
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Adapter over the symbols inkwell can enumerate.
///
/// Aliases and indirect functions are not reachable through inkwell, so a
/// module only yields globals and functions.
pub enum LlvmSymbol<'ctx> {
    Global(GlobalValue<'ctx>),
    Function(FunctionValue<'ctx>),
}

impl Symbol for LlvmSymbol<'_> {
    fn name(&self) -> String {
        match self {
            LlvmSymbol::Global(global) => global.get_name().to_string_lossy().into_owned(),
            LlvmSymbol::Function(function) => function.get_name().to_string_lossy().into_owned(),
        }
    }

    fn set_name(&mut self, name: &str) {
        match self {
            LlvmSymbol::Global(global) => global.as_pointer_value().set_name(name),
            LlvmSymbol::Function(function) => function
                .as_global_value()
                .as_pointer_value()
                .set_name(name),
        }
    }

    fn kind(&self) -> SymbolKind {
        match self {
            LlvmSymbol::Global(_) => SymbolKind::Global,
            LlvmSymbol::Function(_) => SymbolKind::Function,
        }
    }
}

/// Collects the named globals, then the named functions, of a module.
pub fn module_symbols<'ctx>(module: &Module<'ctx>) -> Vec<LlvmSymbol<'ctx>> {
    let mut symbols = vec![];

    let mut global = module.get_first_global();
    while let Some(current) = global {
        symbols.push(LlvmSymbol::Global(current));
        global = current.get_next_global();
    }

    let mut function = module.get_first_function();
    while let Some(current) = function {
        symbols.push(LlvmSymbol::Function(current));
        function = current.get_next_function();
    }

    // LLVM numbers unnamed symbols itself.
    symbols.retain(|symbol| !symbol.name().is_empty());
    symbols
}

/// Makes every top-level name in `module` unique and returns the renames.
pub fn fix_dups(module: &Module<'_>) -> Vec<Rename> {
    let mut symbols = module_symbols(module);
    let renames = Deduplicator::new().fix_all(&mut symbols);
    debug!(renamed = renames.len(), "finalized module symbols");
    renames
}

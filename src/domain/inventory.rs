use std::collections::HashMap;

/// Running sales counts for the inventory tracker: product name -> units
/// sold. Persistence and input capture live elsewhere; this is just the
/// counting logic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: HashMap<String, i64>,
}

/// A parsed sale intent: "vendí 2 gorras" -> 2 units of "gorras".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleCommand {
    pub product: String,
    pub quantity: i64,
}

impl Inventory {
    pub fn new(counts: HashMap<String, i64>) -> Self {
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, product: &str) -> i64 {
        self.counts.get(product).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<String, i64> {
        &self.counts
    }

    pub fn record_sale(&mut self, product: &str, quantity: i64) {
        *self.counts.entry(product.to_string()).or_insert(0) += quantity;
    }

    /// Merge counts from another source (the legacy import path). Existing
    /// products accumulate, new ones are inserted.
    pub fn merge(&mut self, other: &HashMap<String, i64>) {
        for (product, quantity) in other {
            *self.counts.entry(product.clone()).or_insert(0) += quantity;
        }
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Products sorted by units sold, best seller first. Ties break by name
    /// so the ranking is stable.
    pub fn ranked(&self) -> Vec<(String, i64)> {
        let mut items: Vec<(String, i64)> = self
            .counts
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items
    }
}

/// Naive matcher for spoken/typed sale commands in Spanish. The first
/// integer is the quantity; filler words are stripped and whatever remains
/// is the product. Returns None when no quantity or product can be found.
///
/// "vendí 2 buzos" / "venta de 1 gorra" / "2 zapatillas" all match.
pub fn parse_sale_command(text: &str) -> Option<SaleCommand> {
    let text = text.to_lowercase();

    let digits: String = text.chars().skip_while(|c| !c.is_ascii_digit()).collect();
    let digits: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    let quantity: i64 = digits.parse().ok()?;
    if quantity <= 0 {
        return None;
    }

    let product: String = text
        .split_whitespace()
        .filter(|word| {
            !matches!(*word, "vendí" | "vendi" | "venta" | "de")
                && !word.chars().all(|c| c.is_ascii_digit())
        })
        .collect::<Vec<_>>()
        .join(" ");

    if product.len() < 2 {
        return None;
    }

    Some(SaleCommand { product, quantity })
}

/// Drop a trailing plural so "gorras" and "gorra" count as one product.
/// Naive Spanish-only heuristic, same as the original tracker used.
pub fn singularize(product: &str) -> String {
    if let Some(stripped) = product.strip_suffix("es") {
        if stripped.len() >= 4 {
            return stripped.to_string();
        }
    }
    if let Some(stripped) = product.strip_suffix('s') {
        if stripped.len() >= 3 {
            return stripped.to_string();
        }
    }
    product.to_string()
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Icon and color per category name, with a guaranteed default entry.

use serde::Serialize;

use crate::models::UserCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    pub icon: String,
    pub color: String,
}

impl CategoryStyle {
    fn new(icon: &str, color: &str) -> Self {
        CategoryStyle {
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

/// Result of resolving a name: either a registered style or the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedStyle<'a> {
    Known(&'a CategoryStyle),
    Default(&'a CategoryStyle),
}

impl<'a> ResolvedStyle<'a> {
    pub fn style(&self) -> &'a CategoryStyle {
        match self {
            ResolvedStyle::Known(s) | ResolvedStyle::Default(s) => s,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ResolvedStyle::Default(_))
    }
}

const BUILTIN: &[(&str, &str, &str)] = &[
    ("Salário", "Wallet", "hsl(142, 76%, 36%)"),
    ("Freelance", "Briefcase", "hsl(200, 80%, 50%)"),
    ("Investimentos", "TrendingUp", "hsl(262, 83%, 58%)"),
    ("Presente", "Gift", "hsl(340, 80%, 60%)"),
    ("Bônus", "Award", "hsl(45, 93%, 47%)"),
    ("Aluguel Recebido", "Home", "hsl(180, 60%, 45%)"),
    ("Casa", "Home", "hsl(220, 70%, 50%)"),
    ("Contas", "FileText", "hsl(200, 60%, 40%)"),
    ("Aluguel", "Building2", "hsl(220, 60%, 45%)"),
    ("Água", "Droplets", "hsl(200, 80%, 55%)"),
    ("Luz", "Zap", "hsl(45, 93%, 47%)"),
    ("Internet", "Wifi", "hsl(260, 70%, 55%)"),
    ("Telefone", "Phone", "hsl(170, 60%, 45%)"),
    ("Alimentação", "Utensils", "hsl(25, 90%, 50%)"),
    ("Transporte", "Car", "hsl(200, 70%, 50%)"),
    ("Saúde", "HeartPulse", "hsl(350, 70%, 50%)"),
    ("Mercado", "ShoppingCart", "hsl(120, 50%, 45%)"),
    ("Lazer", "Smile", "hsl(45, 80%, 55%)"),
    ("Compras", "ShoppingBag", "hsl(300, 60%, 50%)"),
    ("Entretenimento", "Gamepad2", "hsl(270, 70%, 55%)"),
    ("Restaurante", "UtensilsCrossed", "hsl(15, 80%, 50%)"),
    ("Educação", "GraduationCap", "hsl(210, 80%, 50%)"),
    ("Livros", "BookOpen", "hsl(30, 60%, 50%)"),
    ("Cursos", "Monitor", "hsl(190, 70%, 45%)"),
    ("Viagem", "Plane", "hsl(195, 80%, 50%)"),
    ("Reservas", "PiggyBank", "hsl(340, 70%, 55%)"),
    ("Objetivos", "Target", "hsl(145, 60%, 45%)"),
    ("Poupança", "Landmark", "hsl(220, 60%, 50%)"),
    ("Reserva", "Shield", "hsl(180, 50%, 45%)"),
    ("Outros", "MoreHorizontal", "hsl(0, 0%, 50%)"),
    ("Sem Categoria", "HelpCircle", "hsl(0, 0%, 60%)"),
    ("Despesas Pessoais", "User", "hsl(220, 70%, 50%)"),
];

pub struct StyleRegistry {
    entries: Vec<(String, CategoryStyle)>,
    default: CategoryStyle,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        StyleRegistry {
            entries: BUILTIN
                .iter()
                .map(|(name, icon, color)| (name.to_lowercase(), CategoryStyle::new(icon, color)))
                .collect(),
            default: CategoryStyle::new("CircleDot", "hsl(var(--primary))"),
        }
    }
}

impl StyleRegistry {
    /// Built-in styles overlaid with whatever the user set on their own
    /// categories. A user category missing icon or color keeps the
    /// built-in (or default) value for that half.
    pub fn with_user_categories(categories: &[UserCategory]) -> Self {
        let mut reg = StyleRegistry::default();
        for c in categories {
            if c.icon.is_none() && c.color.is_none() {
                continue;
            }
            let base = reg.resolve(&c.name).style().clone();
            reg.set(
                &c.name,
                CategoryStyle {
                    icon: c.icon.clone().unwrap_or(base.icon),
                    color: c.color.clone().unwrap_or(base.color),
                },
            );
        }
        reg
    }

    pub fn set(&mut self, name: &str, style: CategoryStyle) {
        let key = name.trim().to_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = style,
            None => self.entries.push((key, style)),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&CategoryStyle> {
        let key = name.trim().to_lowercase();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, s)| s)
    }

    pub fn resolve(&self, name: &str) -> ResolvedStyle<'_> {
        match self.lookup(name) {
            Some(s) => ResolvedStyle::Known(s),
            None => ResolvedStyle::Default(&self.default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxKind;

    #[test]
    fn unknown_names_resolve_to_default() {
        let reg = StyleRegistry::default();
        let known = reg.resolve("mercado");
        assert!(!known.is_default());
        assert_eq!(known.style().icon, "ShoppingCart");

        let unknown = reg.resolve("Criptomoedas");
        assert!(unknown.is_default());
        assert_eq!(unknown.style().icon, "CircleDot");
        assert!(reg.lookup("Criptomoedas").is_none());
    }

    #[test]
    fn user_categories_override_by_half() {
        let cats = vec![
            UserCategory {
                id: 1,
                name: "MERCADO".into(),
                kind: TxKind::Expense,
                icon: Some("Apple".into()),
                color: None,
                keywords: vec![],
            },
            UserCategory {
                id: 2,
                name: "Pets".into(),
                kind: TxKind::Expense,
                icon: None,
                color: Some("hsl(10, 10%, 10%)".into()),
                keywords: vec![],
            },
        ];
        let reg = StyleRegistry::with_user_categories(&cats);
        let mercado = reg.resolve("Mercado").style();
        assert_eq!(mercado.icon, "Apple");
        assert_eq!(mercado.color, "hsl(120, 50%, 45%)");
        let pets = reg.resolve("pets");
        assert!(!pets.is_default());
        assert_eq!(pets.style().icon, "CircleDot");
        assert_eq!(pets.style().color, "hsl(10, 10%, 10%)");
    }
}

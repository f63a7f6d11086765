//! User-facing text in the shipped locales.
//!
//! Each locale is a fixed key → string table. Templates use `{name}`
//! placeholders filled by [`Labels::format`].

use clap::ValueEnum;
use std::collections::BTreeMap;

use liftrank_core::domain::{Attribute, Lift};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Pt,
}

/// key, English, Português
const ENTRIES: &[(&str, &str, &str)] = &[
    ("title", "How Strong Are You?", "Quão Forte Você é?"),
    ("sex", "Sex", "Sexo"),
    ("weight_class", "Weight Class", "Classe de Peso"),
    ("equipment", "Modality", "Modalidade"),
    ("division", "Division", "Divisão"),
    ("federation", "Federation", "Federação"),
    ("country", "Country", "País"),
    ("squat", "Squat", "Agachamento"),
    ("bench", "Bench", "Supino"),
    ("deadlift", "Deadlift", "Levantamento Terra"),
    ("total", "Total", "Total"),
    ("submit", "Ready to display results!", "Pronto para exibir os resultados!"),
    (
        "missing_data",
        "Please, fill in the filters to see better comparisons and results.",
        "Por favor, preencha os filtros para visualizar melhores comparações e resultados.",
    ),
    (
        "incomplete_input",
        "Please enter all your lift values to see your position.",
        "Por favor, informe todos os seus levantamentos para ver sua posição.",
    ),
    ("invalid_lifts", "Missing or invalid: {lifts}", "Ausentes ou inválidos: {lifts}"),
    ("distribution", "Distribution of {lift} Values", "Distribuição dos Valores de {lift}"),
    (
        "percentile_generic",
        "Your relative performance on each lift",
        "Sua performance relativa em cada levantamento",
    ),
    (
        "percentile_specific",
        "Your {lift} is better than {percentile}% of the filtered athletes",
        "Seu {lift} é melhor que {percentile}% dos atletas filtrados",
    ),
    (
        "insufficient_data",
        "No athletes match these filters.",
        "Nenhum atleta corresponde a estes filtros.",
    ),
    ("sample_size", "Athletes in group: {count}", "Atletas no grupo: {count}"),
    ("comparison", "Comparison to Top Lifters", "Comparação com os Melhores Levantadores"),
    ("above", "Above", "Acima"),
    ("below", "Below", "Abaixo"),
    (
        "threshold",
        "{percentile}th percentile total: {threshold} kg",
        "Total no percentil {percentile}: {threshold} kg",
    ),
    ("weakest_strongest", "Weakest and Strongest Lifts:", "Melhor e pior levantamento:"),
    ("weakest", "Weakest lift:", "Pior levantamento:"),
    ("strongest", "Strongest Lift:", "Melhor Levantamento:"),
    ("y_axis_label", "Frequency", "Frequência"),
    ("you", "you", "você"),
    ("filter_all", "All", "Todos"),
    ("exported", "Your data was saved to {path}", "Seus dados foram salvos em {path}"),
];

/// Immutable label table for one locale.
#[derive(Debug, Clone)]
pub struct Labels {
    locale: Locale,
    table: BTreeMap<&'static str, &'static str>,
}

impl Labels {
    pub fn new(locale: Locale) -> Self {
        let table = ENTRIES
            .iter()
            .map(|&(key, en, pt)| match locale {
                Locale::En => (key, en),
                Locale::Pt => (key, pt),
            })
            .collect();
        Self { locale, table }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Text for `key`; an unknown key is returned as-is.
    pub fn get<'a>(&self, key: &'a str) -> &'a str {
        self.table.get(key).copied().unwrap_or(key)
    }

    /// Text for `key` with each `{name}` replaced by its value.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.get(key).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    pub fn lift(&self, lift: Lift) -> &'static str {
        self.get(lift.key())
    }

    pub fn attribute(&self, attribute: Attribute) -> &'static str {
        self.get(attribute.key())
    }
}

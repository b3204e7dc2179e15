//! CLI filter flags and their mapping onto query parameters.
//!
//! `--mvn` is shorthand for the registry's `masquerValeursNulles`
//! parameter. Flags left unset are simply omitted from the query.

use clap::Args;

use sirene_core::QueryParams;

/// Filters accepted by the bulk search endpoint.
#[derive(Debug, Args)]
pub struct BulkFilters {
    /// Free-text search query
    #[arg(long)]
    pub q: Option<String>,

    /// Reference date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Pagination cursor; start with "*", then re-supply the payload's
    /// next cursor to continue
    #[arg(long)]
    pub curseur: Option<String>,

    /// Start offset
    #[arg(long)]
    pub debut: Option<String>,

    /// Page size
    #[arg(long)]
    pub nombre: Option<i64>,

    /// Sorting criteria
    #[arg(long, num_args = 1..)]
    pub tri: Vec<String>,

    /// Fields to return
    #[arg(long, num_args = 1..)]
    pub champs: Vec<String>,

    /// Facet fields
    #[arg(long, num_args = 1..)]
    pub facette: Vec<String>,

    /// Hide null values (true/false)
    #[arg(long)]
    pub mvn: Option<String>,
}

impl BulkFilters {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(q) = &self.q {
            params.push("q", q.clone());
        }
        if let Some(date) = &self.date {
            params.push("date", date.clone());
        }
        if let Some(curseur) = &self.curseur {
            params.push("curseur", curseur.clone());
        }
        if let Some(debut) = &self.debut {
            params.push("debut", debut.clone());
        }
        if let Some(nombre) = self.nombre {
            params.push("nombre", nombre);
        }
        if !self.tri.is_empty() {
            params.push("tri", self.tri.clone());
        }
        if !self.champs.is_empty() {
            params.push("champs", self.champs.clone());
        }
        if !self.facette.is_empty() {
            params.push("facette", self.facette.clone());
        }
        if let Some(mvn) = &self.mvn {
            params.push("masquerValeursNulles", mvn.clone());
        }
        params
    }
}

/// Filters accepted by the by-identifier endpoint.
#[derive(Debug, Args)]
pub struct ByIdFilters {
    /// Reference date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Fields to return
    #[arg(long, num_args = 1..)]
    pub champs: Vec<String>,

    /// Hide null values (true/false)
    #[arg(long)]
    pub mvn: Option<String>,
}

impl ByIdFilters {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(date) = &self.date {
            params.push("date", date.clone());
        }
        if !self.champs.is_empty() {
            params.push("champs", self.champs.clone());
        }
        if let Some(mvn) = &self.mvn {
            params.push("masquerValeursNulles", mvn.clone());
        }
        params
    }
}

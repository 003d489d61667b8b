use serde::Deserialize;
use time::Date;

use crate::{
    date_utils::iso_date,
    domain::AnimalStatus,
    error::AppError,
    store::NewAnimal,
};

/// Body of `POST /animals` and `PUT /animals/:id`.
#[derive(Debug, Deserialize)]
pub struct AnimalRequest {
    #[serde(rename = "numero")]
    pub tag_number: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataNascimento", with = "iso_date")]
    pub birth_date: Date,
    #[serde(rename = "raca")]
    pub breed: String,
    pub status: AnimalStatus,
    #[serde(rename = "dataProximoParto", default, with = "iso_date::option")]
    pub next_calving_date: Option<Date>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

fn required(value: String, field: &str) -> Result<String, AppError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(value)
}

impl TryFrom<AnimalRequest> for NewAnimal {
    type Error = AppError;

    fn try_from(req: AnimalRequest) -> Result<Self, Self::Error> {
        Ok(NewAnimal {
            tag_number: required(req.tag_number, "numero")?,
            name: required(req.name, "nome")?,
            birth_date: req.birth_date,
            breed: required(req.breed, "raca")?,
            status: req.status,
            next_calving_date: req.next_calving_date,
            notes: req
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

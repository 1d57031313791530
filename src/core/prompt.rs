use crate::domain::model::Coordinates;
use crate::utils::error::{DiscoveryError, Result};

/// Inputs to [`compose_prompt`].
#[derive(Debug, Clone)]
pub struct PromptRequest<'a> {
    pub query: &'a str,
    pub coordinates: Option<Coordinates>,
    pub radius_km: f64,
    pub max_results: usize,
    pub language: Option<&'a str>,
}

/// Builds the instruction text sent to the search provider.
pub fn compose_prompt(request: &PromptRequest<'_>) -> Result<String> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(DiscoveryError::InvalidInput {
            message: "query is empty".to_string(),
        });
    }

    let mut prompt = format!(
        "Find {} real, currently operating restaurants matching \"{}\". ",
        request.max_results, query
    );

    match request.coordinates {
        Some(coords) => prompt.push_str(&format!(
            "Only include places within {} km of latitude {}, longitude {}. \
             Use these coordinates as the search area even if the query does not name a place. ",
            request.radius_km, coords.latitude, coords.longitude
        )),
        None => prompt.push_str("Infer the area from the query text. "),
    }

    prompt.push_str(
        "Do not invent places, addresses or ratings; return fewer results if unsure. \
         Respond with ONLY a JSON array of objects, no prose and no code fences. \
         Each object must have exactly these fields: \
         \"name\" (string), \"cuisine\" (string), \"rating\" (number from 1 to 5), \
         \"address\" (string), \"priceLevel\" (one of \"$\", \"$$\", \"$$$\", \"$$$$\"), \
         \"googleMapsUri\" (string), \"latitude\" (number), \"longitude\" (number), \
         \"source\" (string naming where the data came from).",
    );

    if let Some(language) = request.language.map(str::trim).filter(|l| !l.is_empty()) {
        prompt.push_str(&format!(
            " Write the text values (name, cuisine, address) in the language with tag \"{}\".",
            language
        ));
    }

    Ok(prompt)
}

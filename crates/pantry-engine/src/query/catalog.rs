//! The built-in query catalog.
//!
//! Definitions are immutable and declared at startup. Every SQL template
//! carries an explicit deterministic ORDER BY with a secondary tiebreak
//! column; remaining ties follow the natural row order of the staged
//! source tables. Filter parameters are optional: an unsupplied
//! parameter binds NULL, and each template treats a NULL filter as
//! "match everything".

/// A user-supplied filter parameter accepted by a query.
#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    /// Parameter name, as passed on the command line.
    pub name: &'static str,
    /// What the parameter restricts.
    pub description: &'static str,
}

/// One named aggregate query.
#[derive(Debug, Clone, Copy)]
pub struct QueryDef {
    /// Catalog name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// SQL template with `?n` placeholders in parameter declaration order.
    pub sql: &'static str,
    /// Source dataset names, staged under these table names.
    pub sources: &'static [&'static str],
    /// Declared output columns, used for the empty-source result.
    pub columns: &'static [&'static str],
    /// Accepted filter parameters, in placeholder order.
    pub params: &'static [ParamDef],
}

/// The full catalog, in presentation order.
pub fn catalog() -> &'static [QueryDef] {
    CATALOG
}

/// Looks up a query definition by name.
pub fn find(name: &str) -> Option<&'static QueryDef> {
    CATALOG.iter().find(|def| def.name == name)
}

const CATALOG: &[QueryDef] = &[
    QueryDef {
        name: "providers_by_city",
        description: "Number of food providers in each city",
        sql: "SELECT City, COUNT(*) AS provider_count \
              FROM providers \
              GROUP BY City \
              ORDER BY provider_count DESC, City ASC",
        sources: &["providers"],
        columns: &["City", "provider_count"],
        params: &[],
    },
    QueryDef {
        name: "receivers_by_city",
        description: "Number of receivers in each city",
        sql: "SELECT City, COUNT(*) AS receiver_count \
              FROM receivers \
              GROUP BY City \
              ORDER BY receiver_count DESC, City ASC",
        sources: &["receivers"],
        columns: &["City", "receiver_count"],
        params: &[],
    },
    QueryDef {
        name: "provider_type_counts",
        description: "Providers per type, optionally restricted to one type",
        sql: "SELECT Type, COUNT(*) AS provider_count \
              FROM providers \
              WHERE (?1 IS NULL OR Type = ?1) \
              GROUP BY Type \
              ORDER BY provider_count DESC, Type ASC",
        sources: &["providers"],
        columns: &["Type", "provider_count"],
        params: &[ParamDef {
            name: "type",
            description: "restrict to one provider type",
        }],
    },
    QueryDef {
        name: "provider_contacts",
        description: "Provider contact information, optionally for one city",
        sql: "SELECT Name, City, Contact \
              FROM providers \
              WHERE (?1 IS NULL OR City = ?1) \
              ORDER BY City ASC, Name ASC",
        sources: &["providers"],
        columns: &["Name", "City", "Contact"],
        params: &[ParamDef {
            name: "city",
            description: "restrict to one city",
        }],
    },
    QueryDef {
        name: "receivers_most_claims",
        description: "Receivers ranked by number of food claims",
        sql: "SELECT r.Name AS Receiver, COUNT(c.Claim_ID) AS claim_count \
              FROM claims c \
              JOIN receivers r ON r.Receiver_ID = c.Receiver_ID \
              GROUP BY r.Receiver_ID, r.Name \
              ORDER BY claim_count DESC, Receiver ASC",
        sources: &["claims", "receivers"],
        columns: &["Receiver", "claim_count"],
        params: &[],
    },
    QueryDef {
        name: "quantity_by_provider_type",
        description: "Total food quantity available from each provider type",
        sql: "SELECT Provider_Type, SUM(Quantity) AS total_quantity \
              FROM food_listings \
              GROUP BY Provider_Type \
              ORDER BY total_quantity DESC, Provider_Type ASC",
        sources: &["food_listings"],
        columns: &["Provider_Type", "total_quantity"],
        params: &[],
    },
    QueryDef {
        name: "listings_by_location",
        description: "Number of food listings in each location",
        sql: "SELECT Location, COUNT(*) AS listing_count \
              FROM food_listings \
              GROUP BY Location \
              ORDER BY listing_count DESC, Location ASC",
        sources: &["food_listings"],
        columns: &["Location", "listing_count"],
        params: &[],
    },
    QueryDef {
        name: "food_type_distribution",
        description: "How many listings each food type has",
        sql: "SELECT Food_Type, COUNT(*) AS listing_count \
              FROM food_listings \
              GROUP BY Food_Type \
              ORDER BY listing_count DESC, Food_Type ASC",
        sources: &["food_listings"],
        columns: &["Food_Type", "listing_count"],
        params: &[],
    },
    QueryDef {
        name: "claims_per_food_item",
        description: "Total claims recorded against each food item",
        sql: "SELECT f.Food_Name, COUNT(c.Claim_ID) AS claim_count \
              FROM food_listings f \
              JOIN claims c ON c.Food_ID = f.Food_ID \
              GROUP BY f.Food_ID, f.Food_Name \
              ORDER BY claim_count DESC, f.Food_Name ASC",
        sources: &["food_listings", "claims"],
        columns: &["Food_Name", "claim_count"],
        params: &[],
    },
    QueryDef {
        name: "claim_status_share",
        description: "Percentage of claims in each status",
        sql: "SELECT Status, COUNT(*) * 100.0 / (SELECT COUNT(*) FROM claims) AS percentage \
              FROM claims \
              GROUP BY Status \
              ORDER BY percentage DESC, Status ASC",
        sources: &["claims"],
        columns: &["Status", "percentage"],
        params: &[],
    },
    QueryDef {
        name: "claims_by_meal_type",
        description: "Number of claims against each meal type",
        sql: "SELECT f.Meal_Type, COUNT(c.Claim_ID) AS claim_count \
              FROM claims c \
              JOIN food_listings f ON f.Food_ID = c.Food_ID \
              GROUP BY f.Meal_Type \
              ORDER BY claim_count DESC, f.Meal_Type ASC",
        sources: &["claims", "food_listings"],
        columns: &["Meal_Type", "claim_count"],
        params: &[],
    },
    QueryDef {
        name: "meal_type_success_rate",
        description: "Share of completed claims per meal type",
        sql: "SELECT f.Meal_Type, \
                     ROUND(SUM(CASE WHEN c.Status = 'Completed' THEN 1 ELSE 0 END) * 100.0 \
                           / COUNT(*), 2) AS success_rate \
              FROM claims c \
              JOIN food_listings f ON f.Food_ID = c.Food_ID \
              GROUP BY f.Meal_Type \
              ORDER BY success_rate DESC, f.Meal_Type ASC",
        sources: &["claims", "food_listings"],
        columns: &["Meal_Type", "success_rate"],
        params: &[],
    },
    QueryDef {
        name: "provider_type_share",
        description: "Percentage share of providers per type",
        sql: "SELECT Type, COUNT(*) * 100.0 / (SELECT COUNT(*) FROM providers) AS percentage_share \
              FROM providers \
              GROUP BY Type \
              ORDER BY percentage_share DESC, Type ASC",
        sources: &["providers"],
        columns: &["Type", "percentage_share"],
        params: &[],
    },
    QueryDef {
        name: "receiver_type_share",
        description: "Percentage share of receivers per type",
        sql: "SELECT Type, COUNT(*) * 100.0 / (SELECT COUNT(*) FROM receivers) AS percentage_share \
              FROM receivers \
              GROUP BY Type \
              ORDER BY percentage_share DESC, Type ASC",
        sources: &["receivers"],
        columns: &["Type", "percentage_share"],
        params: &[],
    },
    QueryDef {
        name: "expiring_soon",
        description: "Listings closest to their expiry date",
        sql: "SELECT Food_Name, Expiry_Date, Location \
              FROM food_listings \
              ORDER BY Expiry_Date ASC, Food_Name ASC \
              LIMIT COALESCE(?1, 10)",
        sources: &["food_listings"],
        columns: &["Food_Name", "Expiry_Date", "Location"],
        params: &[ParamDef {
            name: "limit",
            description: "number of listings to return (default 10)",
        }],
    },
];

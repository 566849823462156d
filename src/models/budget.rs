use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetCategory {
    Flights,
    Accommodation,
    Activities,
    Food,
    Transportation,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 5] = [
        BudgetCategory::Flights,
        BudgetCategory::Accommodation,
        BudgetCategory::Activities,
        BudgetCategory::Food,
        BudgetCategory::Transportation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BudgetCategory::Flights => "flights",
            BudgetCategory::Accommodation => "accommodation",
            BudgetCategory::Activities => "activities",
            BudgetCategory::Food => "food",
            BudgetCategory::Transportation => "transportation",
        }
    }
}

/// The single fallback split used whenever the reasoning service cannot
/// produce a usable allocation. Percentages sum to 100.
pub const DEFAULT_ALLOCATION_POLICY: [(BudgetCategory, f32); 5] = [
    (BudgetCategory::Flights, 30.0),
    (BudgetCategory::Accommodation, 35.0),
    (BudgetCategory::Activities, 15.0),
    (BudgetCategory::Food, 15.0),
    (BudgetCategory::Transportation, 5.0),
];

pub const FALLBACK_SAVINGS_TIPS: [&str; 3] = [
    "Book flights 2-3 months in advance for better prices",
    "Use public transportation instead of taxis",
    "Mix free activities with paid experiences to balance costs",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub percentage: f32,
    pub amount_cents: i64,
}

/// Budget split across the five fixed spending categories. Amounts always
/// sum to the trip budget exactly; the floor-division remainder lands in
/// the activities category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub flights: CategoryAllocation,
    pub accommodation: CategoryAllocation,
    pub activities: CategoryAllocation,
    pub food: CategoryAllocation,
    pub transportation: CategoryAllocation,
    pub feasibility_score: f32,
    pub savings_tips: Vec<String>,
    pub fallback_used: bool,
}

impl BudgetAllocation {
    /// Build an allocation from arbitrary category percentages. The shares
    /// are normalized to sum to exactly 100 before amounts are computed, so
    /// callers validate tolerance (100 +/- 2) beforehand.
    pub fn from_shares(budget_cents: i64, shares: &[(BudgetCategory, f32); 5]) -> Self {
        let sum: f32 = shares.iter().map(|(_, pct)| pct).sum();
        let scale = if sum > 0.0 { 100.0 / sum } else { 0.0 };

        let mut allocations = shares.map(|(category, pct)| {
            let percentage = pct * scale;
            let amount_cents =
                (budget_cents as f64 * percentage as f64 / 100.0).floor() as i64;
            (category, CategoryAllocation { percentage, amount_cents })
        });

        let assigned: i64 = allocations.iter().map(|(_, a)| a.amount_cents).sum();
        let remainder = budget_cents - assigned;
        for (category, allocation) in allocations.iter_mut() {
            if *category == BudgetCategory::Activities {
                allocation.amount_cents += remainder;
            }
        }

        let by_category = |wanted: BudgetCategory| {
            allocations
                .iter()
                .find(|(category, _)| *category == wanted)
                .map(|(_, allocation)| allocation.clone())
                .unwrap_or(CategoryAllocation { percentage: 0.0, amount_cents: 0 })
        };

        Self {
            flights: by_category(BudgetCategory::Flights),
            accommodation: by_category(BudgetCategory::Accommodation),
            activities: by_category(BudgetCategory::Activities),
            food: by_category(BudgetCategory::Food),
            transportation: by_category(BudgetCategory::Transportation),
            feasibility_score: 0.0,
            savings_tips: Vec::new(),
            fallback_used: false,
        }
    }

    /// The deterministic fallback split.
    pub fn fallback(budget_cents: i64) -> Self {
        let mut allocation = Self::from_shares(budget_cents, &DEFAULT_ALLOCATION_POLICY);
        allocation.fallback_used = true;
        allocation
    }

    pub fn get(&self, category: BudgetCategory) -> &CategoryAllocation {
        match category {
            BudgetCategory::Flights => &self.flights,
            BudgetCategory::Accommodation => &self.accommodation,
            BudgetCategory::Activities => &self.activities,
            BudgetCategory::Food => &self.food,
            BudgetCategory::Transportation => &self.transportation,
        }
    }

    pub fn total_amount_cents(&self) -> i64 {
        BudgetCategory::ALL
            .iter()
            .map(|category| self.get(*category).amount_cents)
            .sum()
    }

    pub fn total_percentage(&self) -> f32 {
        BudgetCategory::ALL
            .iter()
            .map(|category| self.get(*category).percentage)
            .sum()
    }
}

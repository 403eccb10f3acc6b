use blackjack_lib::{DealerAction, DealerStrategy, Hand};

/// The house rule for drawing: stand on 18 or more and on a hard 17. A soft 17 is hit
/// unless `hit_soft_seventeen` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseDealer {
    pub hit_soft_seventeen: bool,
}

impl HouseDealer {
    pub fn new(hit_soft_seventeen: bool) -> HouseDealer {
        HouseDealer { hit_soft_seventeen }
    }
}

impl Default for HouseDealer {
    fn default() -> Self {
        HouseDealer::new(true)
    }
}

impl DealerStrategy for HouseDealer {
    fn action(&self, dealer_hand: &Hand) -> Option<DealerAction> {
        let value = dealer_hand.high_valid_value()?;
        if value > 17 || (value == 17 && !(self.hit_soft_seventeen && dealer_hand.is_soft())) {
            Some(DealerAction::Stand)
        } else {
            Some(DealerAction::Hit)
        }
    }
}

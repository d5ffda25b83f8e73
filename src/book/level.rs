use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::book::Order;
use crate::types::{OrderId, Price, Volume};

/// FIFO queue of all resting orders at one price. The queue is the level's
/// sole ownership of its members' book membership; `total_volume` always
/// equals the sum of member sizes.
#[derive(Clone, Debug)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<Order>,
    total_volume: Volume,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_volume: Decimal::ZERO,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn total_volume(&self) -> Volume {
        self.total_volume
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Appends `order` to the FIFO tail.
    pub fn add(&mut self, order: Order) {
        self.total_volume += order.size;
        self.orders.push_back(order);
    }

    /// Removes an order by identity, regardless of queue position.
    ///
    /// Panics if the id is not a member of this level: that means a
    /// double-cancel or a cross-level removal upstream, and silently
    /// continuing would corrupt the volume accounting.
    pub fn remove(&mut self, order_id: OrderId) -> Order {
        let pos = self
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .expect("order is not a member of this price level");
        let order = self
            .orders
            .remove(pos)
            .expect("position came from this queue");
        self.total_volume -= order.size;
        order
    }

    /// Consumes up to `want` from the order at the head of the queue,
    /// popping it once fully filled. Returns the maker id, the size
    /// actually filled, and whether the maker was exhausted; `None` when
    /// the queue is empty.
    pub fn fill_front(&mut self, want: Volume) -> Option<(OrderId, Volume, bool)> {
        let maker = self.orders.front_mut()?;
        let filled = want.min(maker.size);
        maker.size -= filled;
        self.total_volume -= filled;
        let maker_id = maker.id;
        let exhausted = maker.is_filled();
        if exhausted {
            self.orders.pop_front();
        }
        Some((maker_id, filled, exhausted))
    }
}

use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Channel, Currency, Money, Order, OrderId, OrderLine, TaxedMoney, reconstruct,
};
use rust_decimal::Decimal;

fn usd(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2), Currency::USD)
}

fn order_with_lines(count: u32) -> Order {
    let mut order = Order::new(OrderId::new(), None, Channel::new(Currency::USD));
    for index in 0..count {
        let gross = usd(1230 + i64::from(index));
        let net = usd(1000 + i64::from(index));
        let tax = gross.subtract(net).unwrap();
        order
            .add_line(OrderLine::new(
                format!("T3JkZXJMaW5lOns{index}"),
                format!("Product {index}"),
                format!("SKU-{index:03}"),
                1 + index % 4,
                TaxedMoney::from_parts(gross, net, tax).unwrap(),
            ))
            .unwrap();
    }
    order
}

fn bench_totals(c: &mut Criterion) {
    let order = order_with_lines(50);

    c.bench_function("domain/total_50_lines", |b| {
        b.iter(|| order.total().unwrap());
    });

    c.bench_function("domain/line_totals_50_lines", |b| {
        b.iter(|| order.line_totals().unwrap());
    });
}

fn bench_status_derivation(c: &mut Criterion) {
    let order = order_with_lines(50);

    c.bench_function("domain/derive_status_50_lines", |b| {
        b.iter(|| order.derived_status());
    });
}

fn bench_narrative(c: &mut Criterion) {
    let mut order = order_with_lines(5);
    for index in 0..100 {
        order.add_note(format!("note {index}"), None).unwrap();
    }

    c.bench_function("domain/reconstruct_100_events", |b| {
        b.iter(|| reconstruct(order.events().entries()));
    });
}

criterion_group!(benches, bench_totals, bench_status_derivation, bench_narrative);
criterion_main!(benches);

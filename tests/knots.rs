use kh_cube::{isize2, Diagram, DiagramStore, HomologyType, KhConfig, KhError, KhHomology, KhSummand, Poly};
use kh_cube::{check_conjecture1, check_thin, check_torsion_conjecture, euler_characteristic, homological_width, linking_factor, rational_poly, torsion_poly};

type Res = Result<(), Box<dyn std::error::Error>>;

fn compute(name: &str, htype: HomologyType) -> Result<(KhHomology, Poly), KhError> { 
    compute_diagram(Diagram::load(name)?, name, htype)
}

fn compute_diagram(d: Diagram, name: &str, htype: HomologyType) -> Result<(KhHomology, Poly), KhError> {
    let config = KhConfig { homology_type: htype, debug: true, ..Default::default() };
    let mut store = DiagramStore::new(config)?;
    let slot = store.initialize_diagram(d, name, None)?;
    let h = store.homology(slot)?;
    let jones = store.jones_polynomial(slot)?;
    Ok((h, jones))
}

fn ranks(h: &KhHomology) -> Vec<(isize2, usize)> {
    h.nonzero().map(|(idx, s)| (idx, s.rank())).filter(|(_, r)| *r > 0).collect()
}

fn circle() -> Poly { 
    Poly::from_tq([(0, -1, 1), (0, 1, 1)])
}

// alternating knots, with their determinants.
macro_rules! test {
    ($test:ident, $name:literal, $det:expr) => {
        mod $test {
            use super::*;

            #[test]
            fn determinant() -> Res { 
                for t in [HomologyType::Reduced, HomologyType::ReducedOdd] {
                    let (h, _) = compute($name, t)?;
                    assert_eq!(h.total_rank(), $det);
                }
                Ok(())
            }

            #[test]
            fn euler_characteristic() -> Res {
                let (h, jones) = compute($name, HomologyType::Standard)?;
                assert_eq!(kh_cube::euler_characteristic(&h), jones);

                let (h, _) = compute($name, HomologyType::Reduced)?;
                assert_eq!(&kh_cube::euler_characteristic(&h) * &circle(), jones);

                let (h, _) = compute($name, HomologyType::Odd)?;
                assert_eq!(kh_cube::euler_characteristic(&h), jones);

                let (h, _) = compute($name, HomologyType::Unified)?;
                assert_eq!(kh_cube::euler_characteristic(&h), &jones + &jones);
                Ok(())
            }

            #[test]
            fn conjecture() -> Res {
                let (h, _) = compute($name, HomologyType::Standard)?;
                let kh = rational_poly(&h);

                let factor = linking_factor(&Diagram::load($name)?);
                let c = check_conjecture1(&kh, &factor)?;
                assert!(check_thin(&c.remainder)?.is_some());
                check_torsion_conjecture(&torsion_poly(&h), &c.remainder)?;
                assert_eq!(homological_width(&kh).map(|w| w.width), Some(1));
                Ok(())
            }

            #[test]
            fn odd_reduced() -> Res {
                let (even, _) = compute($name, HomologyType::Reduced)?;
                let (odd, _) = compute($name, HomologyType::ReducedOdd)?;
                assert!(even.is_free());
                assert!(odd.is_free());
                assert_eq!(ranks(&even), ranks(&odd));
                assert_eq!(homological_width(&rational_poly(&odd)).map(|w| w.width), Some(0));
                Ok(())
            }

            #[test]
            fn odd_unreduced() -> Res { 
                let (red, _) = compute($name, HomologyType::ReducedOdd)?;
                let (odd, _) = compute($name, HomologyType::Odd)?;
                assert_eq!(rational_poly(&odd), rational_poly(&red) * circle());
                Ok(())
            }

            #[test]
            fn unified() -> Res { 
                let (even, _) = compute($name, HomologyType::Standard)?;
                let (odd, _) = compute($name, HomologyType::Odd)?;
                let (uni, _) = compute($name, HomologyType::Unified)?;
                assert_eq!(rational_poly(&uni), &rational_poly(&even) + &rational_poly(&odd));
                Ok(())
            }
        }
    };
}

test!(k3_1, "3_1", 3);
test!(k4_1, "4_1", 5);
test!(k5_1, "5_1", 5);
test!(k5_2, "5_2", 7);
test!(k6_1, "6_1", 9);
test!(k6_2, "6_2", 11);
test!(k6_3, "6_3", 13);
test!(k7_1, "7_1", 7);
test!(k7_2, "7_2", 11);
test!(k7_3, "7_3", 13);

#[test]
fn hopf_conjecture() -> Res {
    let name = "L2a1";
    let (h, jones) = compute(name, HomologyType::Standard)?;
    assert_eq!(euler_characteristic(&h), jones);

    let factor = linking_factor(&Diagram::load(name)?);
    let c = check_conjecture1(&rational_poly(&h), &factor)?;
    assert_eq!(c.remainder, Poly::default());
    Ok(())
}

#[test]
fn k8_19_is_thick() -> Res {
    let (h, jones) = compute("8_19", HomologyType::Standard)?;
    assert_eq!(euler_characteristic(&h), jones);

    let kh = rational_poly(&h);
    assert!(homological_width(&kh).map_or(false, |w| w.width > 1));

    let (h, _) = compute("8_19", HomologyType::Reduced)?;
    assert_eq!(h.total_rank(), 5);
    Ok(())
}

fn groups(h: &KhHomology) -> Vec<(isize2, KhSummand)> {
    h.nonzero().map(|(idx, s)| (idx, s.clone())).collect()
}

#[test]
fn kinked_figure_eight() -> Res {
    for word in [[1, -2, 1, -2, -3], [1, -2, 1, -2, 3]] {
        let d = Diagram::from_braid(4, &word)?;
        for htype in [HomologyType::Standard, HomologyType::Odd, HomologyType::ReducedOdd] {
            let (h, _) = compute("4_1", htype)?;
            let (k, _) = compute_diagram(d.clone(), "4_1'", htype)?;
            assert_eq!(groups(&h), groups(&k), "{htype}");
        }
    }
    Ok(())
}

#[test]
fn torus_braids() -> Res {
    let t3_4 = Diagram::from_braid(3, &[1, 2, 1, 2, 1, 2, 1, 2])?;
    for htype in [HomologyType::Reduced, HomologyType::ReducedOdd] {
        let (h, _) = compute("8_19", htype)?;
        let (k, _) = compute_diagram(t3_4.clone(), "T(3,4)", htype)?;
        assert_eq!(groups(&h), groups(&k), "{htype}");
    }

    let t3_5 = Diagram::from_braid(3, &[1, 2, 1, 2, 1, 2, 1, 2, 1, 2])?;
    for htype in [HomologyType::Standard, HomologyType::Odd] {
        let (h, jones) = compute_diagram(t3_5.clone(), "T(3,5)", htype)?;
        assert_eq!(euler_characteristic(&h), jones);
    }
    Ok(())
}

use lineage_core::Sex;

use crate::faker_rs::locales::LocaleKey;

const EN_MALE: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Christopher", "Daniel", "Matthew", "Anthony", "Donald", "Mark", "Paul", "Steven",
    "Andrew", "Kenneth", "George", "Edward", "Henry", "Walter", "Arthur", "Samuel",
];

const EN_FEMALE: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah",
    "Karen", "Nancy", "Margaret", "Lisa", "Betty", "Dorothy", "Sandra", "Ashley", "Emily", "Helen",
    "Donna", "Ruth", "Alice", "Frances", "Evelyn", "Grace", "Clara",
];

const PT_BR_MALE: &[&str] = &[
    "João", "José", "Antônio", "Francisco", "Carlos", "Paulo", "Pedro", "Lucas", "Luiz",
    "Marcos", "Luís", "Gabriel", "Rafael", "Daniel", "Marcelo", "Bruno", "Eduardo", "Felipe",
    "Raimundo", "Rodrigo", "Sebastião", "Benedito", "Joaquim", "Manoel",
];

const PT_BR_FEMALE: &[&str] = &[
    "Maria", "Ana", "Francisca", "Antônia", "Adriana", "Juliana", "Márcia", "Fernanda",
    "Patrícia", "Aline", "Sandra", "Camila", "Amanda", "Bruna", "Jéssica", "Letícia", "Júlia",
    "Luciana", "Vanessa", "Mariana", "Benedita", "Rosa", "Terezinha", "Conceição",
];

/// Gendered given names per locale.
pub(crate) fn first_names(locale: LocaleKey, sex: Sex) -> &'static [&'static str] {
    match (locale, sex) {
        (LocaleKey::EnUs, Sex::Male) => EN_MALE,
        (LocaleKey::EnUs, Sex::Female) => EN_FEMALE,
        (LocaleKey::PtBr, Sex::Male) => PT_BR_MALE,
        (LocaleKey::PtBr, Sex::Female) => PT_BR_FEMALE,
    }
}

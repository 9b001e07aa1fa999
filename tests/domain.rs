use kira_ena_fetch::domain::{
    Accession, ReadIndex, RemoteFile, fastq_path, parse_accession_list,
};

#[test]
fn remote_paths_follow_archive_layout() {
    for raw in ["ERR000001", "SRR014966", "DRR123456", "ERR10000001"] {
        let acc: Accession = raw.parse().unwrap();
        let [first, second] = RemoteFile::pair("/vol1/fastq", &acc);
        let shard = &raw[..6];
        assert_eq!(
            first.path,
            format!("/vol1/fastq/{shard}/{raw}/{raw}_1.fastq.gz")
        );
        assert_eq!(
            second.path,
            format!("/vol1/fastq/{shard}/{raw}/{raw}_2.fastq.gz")
        );
        assert_eq!(first.read, ReadIndex::First);
        assert_eq!(second.read, ReadIndex::Second);
    }
}

#[test]
fn local_name_is_last_segment() {
    let acc: Accession = "ERR000001".parse().unwrap();
    let file = RemoteFile::new("/vol1/fastq", &acc, ReadIndex::Second);
    assert_eq!(file.file_name(), "ERR000001_2.fastq.gz");
}

#[test]
fn list_skips_blank_lines_and_keeps_order() {
    let accessions = parse_accession_list("ERR000002\n\n   \n\tERR000001 \r\nSRR1\n");
    let ids: Vec<&str> = accessions.iter().map(Accession::as_str).collect();
    assert_eq!(ids, vec!["ERR000002", "ERR000001", "SRR1"]);
}

#[test]
fn empty_list_yields_nothing() {
    assert!(parse_accession_list("").is_empty());
    assert!(parse_accession_list("\n \n\t\n").is_empty());
}

#[test]
fn read_index_serializes_as_number() {
    let json = serde_json::to_string(&[ReadIndex::First, ReadIndex::Second]).unwrap();
    assert_eq!(json, "[1,2]");
}

#[test]
fn fastq_path_with_root_base() {
    let acc: Accession = "ERR000001".parse().unwrap();
    assert_eq!(
        fastq_path("/", &acc, ReadIndex::First),
        "/ERR000/ERR000001/ERR000001_1.fastq.gz"
    );
}
